use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::candidate;
use crate::error::AppError;

use super::shared::validate_label;

/// Longest accepted candidate name or designation.
pub const MAX_LABEL_LEN: usize = 256;

/// Request body for registering a candidate.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCandidateRequest {
    #[schema(example = "Ana Lima")]
    pub name: String,
    /// Role the candidate is being reviewed for.
    #[schema(example = "Senior Backend Engineer")]
    pub designation: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CandidateResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ana Lima")]
    pub name: String,
    #[schema(example = "Senior Backend Engineer")]
    pub designation: String,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<candidate::Model> for CandidateResponse {
    fn from(m: candidate::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            designation: m.designation,
            created_at: m.created_at,
        }
    }
}

pub fn validate_candidate(name: &str, designation: &str) -> Result<(), AppError> {
    validate_label(name, "Candidate name", MAX_LABEL_LEN)?;
    validate_label(designation, "Candidate designation", MAX_LABEL_LEN)?;
    Ok(())
}
