use chrono::{DateTime, Utc};
use common::{DocumentStatus, ReviewStatus};
use serde::Serialize;

use crate::entity::{design_document, design_review};

use super::evaluation::ScoreResponse;
use super::question::QuestionResponse;

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "design_documents/12/architecture.pdf")]
    pub path: String,
    #[schema(example = "architecture.pdf")]
    pub original_name: String,
    #[schema(example = ".pdf")]
    pub media_type: String,
    #[schema(example = 482113)]
    pub size: i64,
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub content_hash: String,
    pub status: DocumentStatus,
}

impl From<design_document::Model> for DocumentResponse {
    fn from(m: design_document::Model) -> Self {
        Self {
            id: m.id,
            path: m.path,
            original_name: m.original_name,
            media_type: m.media_type,
            size: m.size,
            content_hash: m.content_hash,
            status: m.status,
        }
    }
}

/// Full design review with its documents, questions and score.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 1)]
    pub candidate_id: i32,
    pub status: ReviewStatus,
    /// 0-100 once reviewed.
    #[schema(example = 80)]
    pub overall_score: Option<i32>,
    #[schema(example = "Multi-tenant rate limiting for the public API.")]
    pub problem_description: String,
    #[schema(example = "Token buckets in Redis behind an Envoy filter.")]
    pub proposed_architecture: String,
    pub design_tradeoffs: String,
    pub scalability: String,
    pub security_measures: String,
    pub maintainability: String,
    #[schema(example = 0)]
    pub retry_count: i32,
    /// Code of the last background failure, e.g. `GENERATION_FAILED`.
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub submitted_at: DateTime<Utc>,
    #[schema(example = "2025-10-01T14:31:05Z")]
    pub status_changed_at: DateTime<Utc>,
    pub documents: Vec<DocumentResponse>,
    pub questions: Vec<QuestionResponse>,
    pub score: Option<ScoreResponse>,
}

impl ReviewResponse {
    pub fn new(
        review: design_review::Model,
        documents: Vec<DocumentResponse>,
        questions: Vec<QuestionResponse>,
        score: Option<ScoreResponse>,
    ) -> Self {
        Self {
            id: review.id,
            candidate_id: review.candidate_id,
            status: review.status,
            overall_score: review.overall_score,
            problem_description: review.problem_description,
            proposed_architecture: review.proposed_architecture,
            design_tradeoffs: review.design_tradeoffs,
            scalability: review.scalability,
            security_measures: review.security_measures,
            maintainability: review.maintainability,
            retry_count: review.retry_count,
            error_code: review.error_code,
            error_message: review.error_message,
            submitted_at: review.submitted_at,
            status_changed_at: review.status_changed_at,
            documents,
            questions,
            score,
        }
    }
}

/// What happened to one uploaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Stored,
    Failed,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct FileReport {
    /// Name as sent by the client.
    #[schema(example = "architecture.pdf")]
    pub file_name: String,
    pub outcome: FileOutcome,
    /// Set when stored.
    #[schema(example = 3)]
    pub document_id: Option<i32>,
    /// Set when failed.
    #[schema(example = "Invalid filename: hidden files (starting with '.') are not allowed")]
    pub reason: Option<String>,
}

impl FileReport {
    pub fn stored(file_name: String, document_id: i32) -> Self {
        Self {
            file_name,
            outcome: FileOutcome::Stored,
            document_id: Some(document_id),
            reason: None,
        }
    }

    pub fn failed(file_name: String, reason: impl Into<String>) -> Self {
        Self {
            file_name,
            outcome: FileOutcome::Failed,
            document_id: None,
            reason: Some(reason.into()),
        }
    }
}

/// Response to a design review submission.
#[derive(Serialize, utoipa::ToSchema)]
pub struct IntakeResponse {
    pub review: ReviewResponse,
    /// One entry per uploaded file, in upload order.
    pub files: Vec<FileReport>,
}

/// Response to a manual evaluation trigger or a retry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TransitionResponse {
    #[schema(example = 7)]
    pub review_id: i32,
    pub previous_status: ReviewStatus,
    pub status: ReviewStatus,
    /// True when a background job was queued for the new status.
    #[schema(example = true)]
    pub job_enqueued: bool,
}
