use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mq::Message;

/// Placeholder rendered for narrative sections the candidate left blank.
pub const NOT_PROVIDED: &str = "Not provided";

/// The candidate's six-part written design narrative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNarrative {
    pub problem_description: String,
    pub proposed_architecture: String,
    pub design_tradeoffs: String,
    pub scalability: String,
    pub security_measures: String,
    pub maintainability: String,
}

impl ReviewNarrative {
    /// Labelled sections in presentation order, blank ones replaced by [`NOT_PROVIDED`].
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        fn or_sentinel(value: &str) -> &str {
            if value.trim().is_empty() {
                NOT_PROVIDED
            } else {
                value
            }
        }

        [
            ("Problem Description", or_sentinel(&self.problem_description)),
            ("Proposed Architecture", or_sentinel(&self.proposed_architecture)),
            ("Design Tradeoffs", or_sentinel(&self.design_tradeoffs)),
            ("Scalability", or_sentinel(&self.scalability)),
            ("Security Measures", or_sentinel(&self.security_measures)),
            ("Maintainability", or_sentinel(&self.maintainability)),
        ]
    }
}

/// A stored document the worker must attach to the prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub document_id: i32,
    /// Blob store path (e.g. `design_documents/12/architecture.pdf`).
    pub path: String,
    /// Extension recorded at intake (e.g. `.pdf`).
    pub media_type: String,
    /// Hex SHA-256 of the bytes written at intake.
    pub content_hash: String,
}

/// Who is being evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub designation: String,
}

/// One probing question with its current answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question_id: i32,
    pub question: String,
    pub answer: Option<String>,
}

/// What the worker should do with the review snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewJobKind {
    GenerateQuestions,
    Evaluate {
        candidate: CandidateProfile,
        transcript: Vec<TranscriptEntry>,
    },
}

impl ReviewJobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateQuestions => "generate_questions",
            Self::Evaluate { .. } => "evaluate",
        }
    }
}

/// A review job message sent to the worker queue.
///
/// Carries a full snapshot of what the worker needs so the worker never
/// touches the relational store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewJob {
    /// Job identifier (UUID). Doubles as the idempotency token stored on the review.
    pub job_id: String,
    pub review_id: i32,
    pub narrative: ReviewNarrative,
    pub documents: Vec<DocumentRef>,
    #[serde(flatten)]
    pub kind: ReviewJobKind,
}

impl ReviewJob {
    /// Create a new job with a generated UUID.
    pub fn new(
        review_id: i32,
        narrative: ReviewNarrative,
        documents: Vec<DocumentRef>,
        kind: ReviewJobKind,
    ) -> Self {
        Self::with_id(new_job_id(), review_id, narrative, documents, kind)
    }

    /// Create a job with a caller-chosen id (the id already written to the review row).
    pub fn with_id(
        job_id: String,
        review_id: i32,
        narrative: ReviewNarrative,
        documents: Vec<DocumentRef>,
        kind: ReviewJobKind,
    ) -> Self {
        Self {
            job_id,
            review_id,
            narrative,
            documents,
            kind,
        }
    }
}

/// Generate a fresh job id.
pub fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message for ReviewJob {
    fn message_type() -> &'static str {
        "review_job"
    }

    fn message_id(&self) -> &str {
        &self.job_id
    }

    fn review_id(&self) -> Option<i32> {
        Some(self.review_id)
    }
}
