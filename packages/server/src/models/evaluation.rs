use chrono::{DateTime, Utc};
use common::{ReviewStatus, ScoreStatus};
use serde::Serialize;

use crate::entity::design_review_score;

/// Stored evaluation of a review.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    #[schema(example = 4)]
    pub technical_depth: i32,
    #[schema(example = 5)]
    pub system_design: i32,
    #[schema(example = 3)]
    pub tradeoff: i32,
    #[schema(example = 4)]
    pub ownership: i32,
    /// Mean of the four sub-scores, 1.0-5.0.
    #[schema(example = 4.0)]
    pub overall_score: f64,
    #[schema(example = "Strong decomposition; failure handling needs more depth.")]
    pub feedback_summary: String,
    pub status: ScoreStatus,
    #[schema(example = "2025-10-01T15:02:11Z")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<design_review_score::Model> for ScoreResponse {
    fn from(m: design_review_score::Model) -> Self {
        Self {
            technical_depth: m.technical_depth,
            system_design: m.system_design,
            tradeoff: m.tradeoff,
            ownership: m.ownership,
            overall_score: m.overall_score,
            feedback_summary: m.feedback_summary,
            status: m.status,
            reviewed_at: m.reviewed_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EvaluatedResponse {
    /// Always `true`.
    #[schema(example = true)]
    pub evaluated: bool,
    #[schema(example = 7)]
    pub review_id: i32,
    pub status: ReviewStatus,
    /// 0-100.
    #[schema(example = 80)]
    pub overall_score: Option<i32>,
    pub score: ScoreResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotEvaluatedResponse {
    /// Always `false`.
    #[schema(example = false)]
    pub evaluated: bool,
    pub status: ReviewStatus,
}

/// Evaluation of a review, or its status when none exists yet.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum EvaluationResponse {
    Evaluated(EvaluatedResponse),
    NotEvaluated(NotEvaluatedResponse),
}
