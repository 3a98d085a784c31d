use common::ReviewStatus;
use common::review_job::ReviewJobKind;
use sea_orm::{ActiveModelTrait, Set};

use server::entity::design_review;

use crate::common::{TestApp, routes};

/// Force a review into `Error` as a failed background job would.
async fn fail_review(app: &TestApp, review_id: i32) {
    let review = app.review_row(review_id).await;
    let mut update: design_review::ActiveModel = review.into();
    update.status = Set(ReviewStatus::Error);
    update.error_code = Set(Some("GENERATION_FAILED".into()));
    update.error_message = Set(Some("generator unavailable".into()));
    update.active_job_id = Set(None);
    update.update(&app.db).await.unwrap();
}

mod manual_evaluation {
    use super::*;

    #[tokio::test]
    async fn rejected_until_all_answered() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        app.answer_all(review_id, &ids[..4]).await;

        let res = app.post_empty(&routes::evaluate(review_id)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn pending_review_conflicts() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let res = app.post_empty(&routes::evaluate(review_id)).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn trigger_replaces_active_job() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        app.answer_all(review_id, &ids).await;
        let first_job = app.review_row(review_id).await.active_job_id.unwrap();

        let res = app.post_empty(&routes::evaluate(review_id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["previous_status"], "InProgress");
        assert_eq!(res.body["status"], "InProgress");
        assert_eq!(res.body["job_enqueued"], true);

        let review = app.review_row(review_id).await;
        assert_ne!(review.active_job_id.as_deref(), Some(first_job.as_str()));
        let last = app.queue.last().unwrap();
        assert!(matches!(last.kind, ReviewJobKind::Evaluate { .. }));
        assert_eq!(review.active_job_id, Some(last.job_id));
    }

    #[tokio::test]
    async fn unknown_review_is_404() {
        let app = TestApp::spawn().await;
        let res = app.post_empty(&routes::evaluate(31337)).await;
        assert_eq!(res.status, 404);
    }
}

mod retry {
    use super::*;

    #[tokio::test]
    async fn retry_requires_error_status() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let res = app.post_empty(&routes::retry(review_id)).await;
        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn retry_without_questions_regenerates() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        fail_review(&app, review_id).await;

        let res = app.post_empty(&routes::retry(review_id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["previous_status"], "Error");
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["job_enqueued"], true);

        let review = app.review_row(review_id).await;
        assert!(review.error_code.is_none());
        let last = app.queue.last().unwrap();
        assert_eq!(last.kind, ReviewJobKind::GenerateQuestions);
        assert_eq!(review.active_job_id, Some(last.job_id));
    }

    #[tokio::test]
    async fn retry_with_open_questions_waits_for_answers() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        app.answer_all(review_id, &ids[..2]).await;
        fail_review(&app, review_id).await;
        let jobs_before = app.queue.jobs().len();

        let res = app.post_empty(&routes::retry(review_id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "QuestionsGenerated");
        assert_eq!(res.body["job_enqueued"], false);
        assert_eq!(app.queue.jobs().len(), jobs_before);
    }

    #[tokio::test]
    async fn retry_of_answered_review_reevaluates() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;
        let ids = app.generate_questions(review_id, 5).await;
        app.answer_all(review_id, &ids).await;
        fail_review(&app, review_id).await;

        let res = app.post_empty(&routes::retry(review_id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "InProgress");
        let last = app.queue.last().unwrap();
        assert!(matches!(last.kind, ReviewJobKind::Evaluate { .. }));
    }
}
