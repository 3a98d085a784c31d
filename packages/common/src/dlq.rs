use serde::{Deserialize, Serialize};

use crate::retry::RetryAttempt;

/// Error codes persisted on a review when background processing gives up.
pub struct ReviewErrorCode;

impl ReviewErrorCode {
    /// Question generation failed after exhausting retries.
    pub const GENERATION_FAILED: &'static str = "GENERATION_FAILED";
    /// Evaluation failed after exhausting retries.
    pub const EVALUATION_FAILED: &'static str = "EVALUATION_FAILED";
    /// The job payload could not be decoded by the worker.
    pub const INVALID_JOB: &'static str = "INVALID_JOB";
    /// Server failed to apply a worker outcome.
    pub const OUTCOME_PROCESSING_FAILED: &'static str = "OUTCOME_PROCESSING_FAILED";
    /// Review sat in a worker-owned state past the stuck timeout.
    pub const STUCK_JOB: &'static str = "STUCK_JOB";
}

/// Error codes for dead-lettered messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DlqErrorCode {
    /// All retry attempts exhausted.
    MaxRetriesExceeded,
    /// Failed to deserialize message payload.
    DeserializationError,
    /// A referenced document is missing or no longer matches its intake checksum.
    DocumentUnavailable,
}

impl DlqErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            Self::DeserializationError => "DESERIALIZATION_ERROR",
            Self::DocumentUnavailable => "DOCUMENT_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for DlqErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which direction the failed message was travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DlqMessageType {
    /// Server -> worker.
    ReviewJob,
    /// Worker -> server.
    ReviewOutcome,
}

impl DlqMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewJob => "review_job",
            Self::ReviewOutcome => "review_outcome",
        }
    }
}

impl std::fmt::Display for DlqMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope for transporting failed messages to the DLQ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqEnvelope {
    /// Original message ID (job_id).
    pub message_id: String,
    pub message_type: DlqMessageType,
    /// `None` when the payload was too broken to recover the review id.
    pub review_id: Option<i32>,
    /// `generate_questions` or `evaluate` when known.
    pub job_kind: Option<String>,
    /// The document that could not be read, for `DocumentUnavailable`.
    #[serde(default)]
    pub document_id: Option<i32>,
    /// Full serialized message payload.
    pub payload: serde_json::Value,
    pub error_code: DlqErrorCode,
    pub error_message: String,
    /// Attempts made before giving up. Empty when the payload could not be decoded.
    pub retry_history: Vec<RetryAttempt>,
}

impl DlqEnvelope {
    /// Review-level error code for this failure.
    pub fn review_error_code(&self) -> &'static str {
        match (self.error_code, self.message_type, self.job_kind.as_deref()) {
            (DlqErrorCode::DeserializationError, DlqMessageType::ReviewJob, _) => {
                ReviewErrorCode::INVALID_JOB
            }
            (_, DlqMessageType::ReviewOutcome, _) => ReviewErrorCode::OUTCOME_PROCESSING_FAILED,
            (_, _, Some("evaluate")) => ReviewErrorCode::EVALUATION_FAILED,
            _ => ReviewErrorCode::GENERATION_FAILED,
        }
    }
}
