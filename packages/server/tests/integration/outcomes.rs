use common::review_outcome::ReviewOutcome;
use common::{DocumentStatus, ReviewErrorCode, ReviewStatus};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use server::consumers::review_result::{Applied, apply_outcome};
use server::entity::{design_document, design_review_score};

use crate::common::{TestApp, TestFile, routes, sample_questions, sample_scores};

/// Submit, generate and answer everything; returns the review id and evaluation job id.
async fn answered_review(app: &TestApp) -> (i32, String) {
    let review_id = app.submit_review(vec![]).await;
    let ids = app.generate_questions(review_id, 5).await;
    let res = app.answer_all(review_id, &ids).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let job_id = app.review_row(review_id).await.active_job_id.unwrap();
    (review_id, job_id)
}

async fn score_rows(app: &TestApp, review_id: i32) -> u64 {
    design_review_score::Entity::find()
        .filter(design_review_score::Column::ReviewId.eq(review_id))
        .count(&app.db)
        .await
        .unwrap()
}

mod generation_outcome {
    use super::*;

    #[tokio::test]
    async fn questions_stored_and_documents_analyzed() {
        let app = TestApp::spawn().await;
        let review_id = app
            .submit_review(vec![TestFile::new("design.pdf", b"%PDF")])
            .await;

        let ids = app.generate_questions(review_id, 7).await;
        assert_eq!(ids.len(), 7);

        let review = app.review_row(review_id).await;
        assert_eq!(review.status, ReviewStatus::QuestionsGenerated);
        assert!(review.active_job_id.is_none());

        let documents = design_document::Entity::find()
            .filter(design_document::Column::ReviewId.eq(review_id))
            .all(&app.db)
            .await
            .unwrap();
        assert!(
            documents
                .iter()
                .all(|d| d.status == DocumentStatus::Analyzed)
        );
    }

    #[tokio::test]
    async fn duplicate_generation_outcome_ignored() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let job_id = app.review_row(review_id).await.active_job_id.unwrap();

        let outcome = ReviewOutcome::questions_generated(&job_id, review_id, sample_questions(5));
        let first = apply_outcome(&app.db, outcome.clone()).await.unwrap();
        assert_eq!(first, Applied::Applied);
        let second = apply_outcome(&app.db, outcome).await.unwrap();
        assert!(matches!(second, Applied::Ignored(_)));

        assert_eq!(app.question_ids(review_id).await.len(), 5);
    }

    #[tokio::test]
    async fn stale_job_id_ignored() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let outcome =
            ReviewOutcome::questions_generated("not-the-active-job", review_id, sample_questions(5));
        let applied = apply_outcome(&app.db, outcome).await.unwrap();
        assert_eq!(applied, Applied::Ignored("stale job"));
        assert!(app.question_ids(review_id).await.is_empty());
        assert_eq!(
            app.review_row(review_id).await.status,
            ReviewStatus::Pending
        );
    }

    #[tokio::test]
    async fn deleted_review_drops_outcome() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let job_id = app.review_row(review_id).await.active_job_id.unwrap();

        let res = app.delete(&routes::review(review_id)).await;
        assert_eq!(res.status, 204);

        let outcome = ReviewOutcome::questions_generated(job_id, review_id, sample_questions(5));
        let applied = apply_outcome(&app.db, outcome).await.unwrap();
        assert_eq!(applied, Applied::Ignored("review deleted"));
    }

    #[tokio::test]
    async fn invalid_question_batch_marks_error() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let job_id = app.review_row(review_id).await.active_job_id.unwrap();

        let outcome = ReviewOutcome::questions_generated(job_id, review_id, sample_questions(2));
        let applied = apply_outcome(&app.db, outcome).await.unwrap();
        assert_eq!(applied, Applied::Rejected);

        let review = app.review_row(review_id).await;
        assert_eq!(review.status, ReviewStatus::Error);
        assert_eq!(
            review.error_code.as_deref(),
            Some(ReviewErrorCode::OUTCOME_PROCESSING_FAILED)
        );
        assert_eq!(review.retry_count, 1);
        assert!(app.question_ids(review_id).await.is_empty());
    }
}

mod evaluation_outcome {
    use super::*;

    #[tokio::test]
    async fn scores_stored_with_percent_overall() {
        let app = TestApp::spawn().await;
        let (review_id, job_id) = answered_review(&app).await;

        let applied = apply_outcome(
            &app.db,
            ReviewOutcome::evaluated(job_id, review_id, sample_scores()),
        )
        .await
        .unwrap();
        assert_eq!(applied, Applied::Applied);

        let review = app.review_row(review_id).await;
        assert_eq!(review.status, ReviewStatus::Reviewed);
        assert_eq!(review.overall_score, Some(80));

        let res = app.get(&routes::evaluation(review_id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["evaluated"], true);
        assert_eq!(res.body["overall_score"], 80);
        assert_eq!(res.body["score"]["overall_score"], 4.0);
        assert_eq!(res.body["score"]["status"], "Completed");
    }

    #[tokio::test]
    async fn repeated_outcome_keeps_one_score_row() {
        let app = TestApp::spawn().await;
        let (review_id, job_id) = answered_review(&app).await;
        let outcome = ReviewOutcome::evaluated(job_id, review_id, sample_scores());

        apply_outcome(&app.db, outcome.clone()).await.unwrap();
        let second = apply_outcome(&app.db, outcome).await.unwrap();
        assert!(matches!(second, Applied::Ignored(_)));

        assert_eq!(score_rows(&app, review_id).await, 1);
    }

    #[tokio::test]
    async fn re_evaluation_replaces_score() {
        let app = TestApp::spawn().await;
        let (review_id, job_id) = answered_review(&app).await;
        apply_outcome(
            &app.db,
            ReviewOutcome::evaluated(job_id, review_id, sample_scores()),
        )
        .await
        .unwrap();

        let res = app.post_empty(&routes::evaluate(review_id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let job_id = app.review_row(review_id).await.active_job_id.unwrap();

        let mut scores = sample_scores();
        scores.tradeoff = 5;
        scores.ownership = 5;
        apply_outcome(&app.db, ReviewOutcome::evaluated(job_id, review_id, scores))
            .await
            .unwrap();

        assert_eq!(score_rows(&app, review_id).await, 1);
        // (4 + 5 + 5 + 5) / 4 = 4.75 -> 95
        assert_eq!(app.review_row(review_id).await.overall_score, Some(95));
    }

    #[tokio::test]
    async fn out_of_range_scores_mark_error() {
        let app = TestApp::spawn().await;
        let (review_id, job_id) = answered_review(&app).await;

        let mut scores = sample_scores();
        scores.system_design = 9;
        let applied = apply_outcome(&app.db, ReviewOutcome::evaluated(job_id, review_id, scores))
            .await
            .unwrap();
        assert_eq!(applied, Applied::Rejected);

        assert_eq!(app.review_row(review_id).await.status, ReviewStatus::Error);
        assert_eq!(score_rows(&app, review_id).await, 0);
    }

    #[tokio::test]
    async fn unevaluated_review_reports_status() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let res = app.get(&routes::evaluation(review_id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["evaluated"], false);
        assert_eq!(res.body["status"], "Pending");
    }
}
