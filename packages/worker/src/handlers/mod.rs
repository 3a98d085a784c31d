pub mod evaluate;
pub mod generate;

use std::sync::Arc;
use std::time::Duration;

use common::review_job::{DocumentRef, ReviewJob, ReviewJobKind};
use common::review_outcome::ReviewOutcome;
use common::storage::{BlobPath, BlobStore, ContentHash};
use tracing::debug;

use crate::error::{JobError, Result};
use crate::llm::{ContentPart, GenerationRequest, Generator, generate_with_timeout};

/// Dependencies shared by every job handler.
#[derive(Clone)]
pub struct JobContext {
    pub generator: Arc<dyn Generator>,
    pub store: Arc<dyn BlobStore>,
    pub llm_timeout: Duration,
}

impl JobContext {
    pub async fn generate(&self, request: GenerationRequest) -> Result<serde_json::Value> {
        Ok(generate_with_timeout(self.generator.as_ref(), request, self.llm_timeout).await?)
    }
}

/// Run one attempt of a job and return the outcome to publish.
pub async fn handle_job(ctx: &JobContext, job: &ReviewJob) -> Result<ReviewOutcome> {
    match &job.kind {
        ReviewJobKind::GenerateQuestions => generate::handle_generate(ctx, job).await,
        ReviewJobKind::Evaluate {
            candidate,
            transcript,
        } => evaluate::handle_evaluate(ctx, job, candidate, transcript).await,
    }
}

/// MIME type for a stored document, keyed by the extension recorded at intake.
pub fn mime_for(media_type: &str) -> String {
    let ext = media_type.trim_start_matches('.').to_ascii_lowercase();
    if ext == "pdf" {
        return "application/pdf".to_string();
    }
    mime_guess::from_ext(&ext)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read every referenced document and verify it is the blob written at intake.
pub async fn load_attachments(
    store: &dyn BlobStore,
    documents: &[DocumentRef],
) -> Result<Vec<ContentPart>> {
    let mut parts = Vec::with_capacity(documents.len());
    for doc in documents {
        let path =
            BlobPath::parse(&doc.path).map_err(|e| JobError::storage(doc.document_id, e))?;
        let expected = ContentHash::from_hex(&doc.content_hash)
            .map_err(|e| JobError::storage(doc.document_id, e))?;
        let data = store
            .get_verified(&path, &expected)
            .await
            .map_err(|e| JobError::storage(doc.document_id, e))?;

        debug!(
            document_id = doc.document_id,
            path = %path,
            bytes = data.len(),
            "Loaded document"
        );
        parts.push(ContentPart::Attachment {
            mime_type: mime_for(&doc.media_type),
            data,
        });
    }
    Ok(parts)
}
