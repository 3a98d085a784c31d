use common::review_outcome::SchemaError;
use common::storage::StorageError;
use thiserror::Error;

/// Failures talking to the external generator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generator call timed out after {0}s")]
    Timeout(u64),

    #[error("Generator returned no content")]
    EmptyResponse,

    #[error("Generator returned non-JSON content: {0}")]
    Decode(String),
}

/// Why a single job attempt failed.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Document {document_id} unavailable: {source}")]
    Storage {
        document_id: i32,
        #[source]
        source: StorageError,
    },

    #[error("Document {document_id} changed since intake: {detail}")]
    ChecksumMismatch { document_id: i32, detail: String },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Generator output rejected: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to publish: {0}")]
    Publish(String),
}

impl JobError {
    pub fn storage(document_id: i32, source: StorageError) -> Self {
        match source {
            StorageError::ChecksumMismatch { .. } => Self::ChecksumMismatch {
                document_id,
                detail: source.to_string(),
            },
            source => Self::Storage {
                document_id,
                source,
            },
        }
    }

    /// The document a failed read was for, when the bytes themselves are the problem.
    ///
    /// A missing or altered blob will not come back on a later attempt, so these
    /// errors skip the retry budget.
    pub fn unavailable_document(&self) -> Option<i32> {
        match self {
            Self::ChecksumMismatch { document_id, .. }
            | Self::Storage {
                document_id,
                source: StorageError::NotFound(_),
            } => Some(*document_id),
            _ => None,
        }
    }
}

impl From<mq::MqError> for JobError {
    fn from(e: mq::MqError) -> Self {
        JobError::Publish(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JobError>;
