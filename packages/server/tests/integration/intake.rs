use common::review_job::ReviewJobKind;

use crate::common::{NARRATIVE, TestApp, TestFile, routes};

fn narrative_fields() -> Vec<(&'static str, String)> {
    NARRATIVE.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn zero_files_queues_one_generation_job() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let jobs = app.queue.jobs();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.review_id, review_id);
        assert_eq!(job.kind, ReviewJobKind::GenerateQuestions);
        assert!(job.documents.is_empty());
        assert_eq!(
            job.narrative.problem_description,
            "Rate limit the public API per tenant."
        );

        let review = app.review_row(review_id).await;
        assert_eq!(review.status, common::ReviewStatus::Pending);
        assert_eq!(review.active_job_id.as_deref(), Some(job.job_id.as_str()));
    }

    #[tokio::test]
    async fn documents_are_stored_and_referenced_by_the_job() {
        let app = TestApp::spawn().await;
        let review_id = app
            .submit_review(vec![
                TestFile::new("architecture.pdf", b"%PDF-1.4 diagram"),
                TestFile::new("notes.md", b"# Notes"),
            ])
            .await;

        let res = app.get(&routes::review(review_id)).await;
        assert_eq!(res.status, 200);
        let documents = res.body["documents"].as_array().unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(
            documents[0]["path"],
            format!("design_documents/{review_id}/architecture.pdf")
        );
        assert_eq!(documents[0]["media_type"], ".pdf");
        assert_eq!(documents[0]["status"], "pending");

        let job = app.queue.last().unwrap();
        assert_eq!(job.documents.len(), 2);
        assert!(
            app.blob_dir
                .path()
                .join(format!("design_documents/{review_id}/notes.md"))
                .exists()
        );
    }

    #[tokio::test]
    async fn failed_file_is_reported_and_others_kept() {
        let app = TestApp::spawn().await;
        let candidate_id = app.create_candidate("Partial").await;
        let mut fields = narrative_fields();
        fields.push(("candidate_id", candidate_id.to_string()));

        let res = app
            .submit_form(
                &fields,
                vec![
                    TestFile::new("design.txt", b"plain text design"),
                    TestFile::new(".env", b"SECRET=1"),
                ],
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let files = res.body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["outcome"], "stored");
        assert_eq!(files[1]["outcome"], "failed");
        assert!(files[1]["reason"].as_str().unwrap().contains("hidden"));

        assert_eq!(res.body["review"]["documents"].as_array().unwrap().len(), 1);
        assert_eq!(app.queue.jobs().len(), 1);
        assert_eq!(app.queue.last().unwrap().documents.len(), 1);
    }

    #[tokio::test]
    async fn same_file_name_in_two_reviews_keeps_both_blobs() {
        let app = TestApp::spawn().await;
        let first = app
            .submit_review(vec![TestFile::new("design.pdf", b"%PDF first")])
            .await;
        let first_job = app.queue.last().unwrap();
        let second = app
            .submit_review(vec![TestFile::new("design.pdf", b"%PDF second")])
            .await;
        let second_job = app.queue.last().unwrap();

        assert_ne!(first_job.documents[0].path, second_job.documents[0].path);
        let read = |review_id: i32| {
            std::fs::read(
                app.blob_dir
                    .path()
                    .join(format!("design_documents/{review_id}/design.pdf")),
            )
            .unwrap()
        };
        assert_eq!(read(first), b"%PDF first");
        assert_eq!(read(second), b"%PDF second");
    }

    #[tokio::test]
    async fn repeated_file_name_in_one_submission_is_refused() {
        let app = TestApp::spawn().await;
        let candidate_id = app.create_candidate("Twice").await;
        let mut fields = narrative_fields();
        fields.push(("candidate_id", candidate_id.to_string()));

        let res = app
            .submit_form(
                &fields,
                vec![
                    TestFile::new("design.pdf", b"%PDF v1"),
                    TestFile::new("design.pdf", b"%PDF v2"),
                ],
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let files = res.body["files"].as_array().unwrap();
        assert_eq!(files[0]["outcome"], "stored");
        assert_eq!(files[1]["outcome"], "failed");
        assert!(files[1]["reason"].as_str().unwrap().contains("Duplicate"));

        let review_id = res.body["review"]["id"].as_i64().unwrap();
        let stored = std::fs::read(
            app.blob_dir
                .path()
                .join(format!("design_documents/{review_id}/design.pdf")),
        )
        .unwrap();
        assert_eq!(stored, b"%PDF v1");
    }

    #[tokio::test]
    async fn new_candidate_created_from_fields() {
        let app = TestApp::spawn().await;
        let mut fields = narrative_fields();
        fields.push(("candidate_name", "Linus".to_string()));
        fields.push(("candidate_designation", "Principal Engineer".to_string()));

        let res = app.submit_form(&fields, vec![]).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let candidates = app.get(routes::CANDIDATES).await;
        assert_eq!(candidates.body.as_array().unwrap().len(), 1);
        assert_eq!(candidates.body[0]["name"], "Linus");
    }

    #[tokio::test]
    async fn missing_candidate_rejected() {
        let app = TestApp::spawn().await;
        let res = app.submit_form(&narrative_fields(), vec![]).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn unknown_candidate_is_404() {
        let app = TestApp::spawn().await;
        let mut fields = narrative_fields();
        fields.push(("candidate_id", "4242".to_string()));

        let res = app.submit_form(&fields, vec![]).await;
        assert_eq!(res.status, 404);
        assert!(app.queue.jobs().is_empty());
    }
}

mod review_lookup {
    use super::*;

    #[tokio::test]
    async fn delete_review_removes_blobs() {
        let app = TestApp::spawn().await;
        let review_id = app
            .submit_review(vec![TestFile::new("only.pdf", b"bytes")])
            .await;
        let blob = app
            .blob_dir
            .path()
            .join(format!("design_documents/{review_id}/only.pdf"));
        assert!(blob.exists());

        let res = app.delete(&routes::review(review_id)).await;
        assert_eq!(res.status, 204);
        assert!(!blob.exists());

        let res = app.get(&routes::review(review_id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn pending_review_has_no_questions() {
        let app = TestApp::spawn().await;
        let review_id = app.submit_review(vec![]).await;

        let res = app.get(&routes::questions(review_id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["total_count"], 0);
        assert!(res.body["questions"].as_array().unwrap().is_empty());
    }
}
