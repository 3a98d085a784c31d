use common::ReviewStatus;
use common::review_job::ReviewJobKind;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use server::entity::probing_question;

use crate::common::{TestApp, routes};

async fn stored_answers(app: &TestApp, review_id: i32) -> u64 {
    probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review_id))
        .filter(probing_question::Column::Answer.is_not_null())
        .count(&app.db)
        .await
        .unwrap()
}

mod batch_answers {
    use super::*;

    #[tokio::test]
    async fn partial_batch_keeps_review_open() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        let res = app.answer_all(review_id, &ids[..2]).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["answered_count"], 2);
        assert_eq!(res.body["total_count"], 5);
        assert_eq!(res.body["evaluation_triggered"], false);
        assert_eq!(res.body["status"], "QuestionsGenerated");
        assert_eq!(app.queue.jobs().len(), 1);
    }

    #[tokio::test]
    async fn last_answer_triggers_evaluation_once() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        let res = app.answer_all(review_id, &ids).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["evaluation_triggered"], true);
        assert_eq!(res.body["status"], "InProgress");

        let jobs = app.queue.jobs();
        assert_eq!(jobs.len(), 2);
        let ReviewJobKind::Evaluate {
            candidate,
            transcript,
        } = &jobs[1].kind
        else {
            panic!("expected an evaluation job, got {:?}", jobs[1].kind);
        };
        assert_eq!(candidate.name, "Ada Lovelace");
        assert_eq!(transcript.len(), 5);
        assert!(transcript.iter().all(|t| t.answer.is_some()));

        let review = app.review_row(review_id).await;
        assert_eq!(review.active_job_id.as_deref(), Some(jobs[1].job_id.as_str()));

        // Re-answering a completed review does not queue another evaluation.
        let res = app.answer_all(review_id, &ids[..1]).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["evaluation_triggered"], false);
        assert_eq!(app.queue.jobs().len(), 2);
    }

    #[tokio::test]
    async fn foreign_question_id_writes_nothing() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        let other_review = app.submit_review(vec![]).await;
        let other_ids = app.generate_questions(other_review, 5).await;

        let mut mixed = ids.clone();
        mixed.push(other_ids[0]);
        mixed.push(999_999);

        let res = app.answer_all(review_id, &mixed).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        let details = res.body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);

        assert_eq!(stored_answers(&app, review_id).await, 0);
        assert_eq!(stored_answers(&app, other_review).await, 0);
        assert_eq!(
            app.review_row(review_id).await.status,
            ReviewStatus::QuestionsGenerated
        );
    }

    #[tokio::test]
    async fn duplicate_ids_rejected() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        let res = app.answer_all(review_id, &[ids[0], ids[0]]).await;
        assert_eq!(res.status, 400);
        assert_eq!(stored_answers(&app, review_id).await, 0);
    }

    #[tokio::test]
    async fn empty_batch_rejected() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let res = app
            .post(&routes::answer_batch(review_id), &json!({"answers": []}))
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_review_is_404() {
        let app = TestApp::spawn().await;
        let res = app.answer_all(4242, &[1]).await;
        assert_eq!(res.status, 404);
    }
}

mod single_answer {
    use super::*;

    #[tokio::test]
    async fn empty_answer_counts_as_answered() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        let res = app.post(&routes::answer_single(ids[0]), &json!({})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["answered_count"], 1);
        assert_eq!(res.body["answered"][0]["answer"], "");
    }

    #[tokio::test]
    async fn answering_one_by_one_completes_review() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        for (i, id) in ids.iter().enumerate() {
            let res = app
                .post(&routes::answer_single(*id), &json!({"answer": "We shard."}))
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
            let answered = res.body["answered_count"].as_u64().unwrap();
            let total = res.body["total_count"].as_u64().unwrap();
            assert!(answered <= total);
            assert_eq!(res.body["evaluation_triggered"], i == ids.len() - 1);
        }

        assert_eq!(
            app.review_row(review_id).await.status,
            ReviewStatus::InProgress
        );
        assert_eq!(app.queue.jobs().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_final_answers_queue_one_evaluation() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        let res = app.answer_all(review_id, &ids[..3]).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let (route_a, body_a) = (
            routes::answer_single(ids[3]),
            json!({"answer": "Consistent hashing."}),
        );
        let (route_b, body_b) = (
            routes::answer_single(ids[4]),
            json!({"answer": "Token buckets."}),
        );
        let (a, b) = tokio::join!(app.post(&route_a, &body_a), app.post(&route_b, &body_b));
        assert_eq!(a.status, 200, "{}", a.text);
        assert_eq!(b.status, 200, "{}", b.text);

        let triggered = [&a, &b]
            .iter()
            .filter(|r| r.body["evaluation_triggered"] == true)
            .count();
        assert_eq!(triggered, 1);

        let evaluations: Vec<_> = app
            .queue
            .jobs()
            .into_iter()
            .filter(|job| matches!(job.kind, ReviewJobKind::Evaluate { .. }))
            .collect();
        assert_eq!(evaluations.len(), 1);

        let review = app.review_row(review_id).await;
        assert_eq!(review.status, ReviewStatus::InProgress);
        assert_eq!(
            review.active_job_id.as_deref(),
            Some(evaluations[0].job_id.as_str())
        );
        assert_eq!(stored_answers(&app, review_id).await, 5);
    }

    #[tokio::test]
    async fn too_long_answer_rejected() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;

        let res = app
            .post(
                &routes::answer_single(ids[0]),
                &json!({"answer": "x".repeat(5001)}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(stored_answers(&app, review_id).await, 0);
    }

    #[tokio::test]
    async fn unknown_question_is_404() {
        let app = TestApp::spawn().await;
        let res = app
            .post(&routes::answer_single(777), &json!({"answer": "a"}))
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn question_list_reports_progress() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 6).await;
        app.answer_all(review_id, &ids[..3]).await;

        let res = app.get(&routes::questions(review_id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["answered_count"], 3);
        assert_eq!(res.body["total_count"], 6);
        let positions: Vec<i64> = res.body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);
    }
}
