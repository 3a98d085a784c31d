#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a design review during the evaluation workflow.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum ReviewStatus {
    /// Submitted, waiting for question generation.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Probing questions exist and are awaiting answers.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "QuestionsGenerated"))]
    QuestionsGenerated,
    /// Every question is answered; evaluation is queued or running.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "InProgress"))]
    InProgress,
    /// Evaluation finished and a score is attached.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Reviewed"))]
    Reviewed,
    /// Reserved for legacy rows. No transition enters this state.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Incomplete"))]
    Incomplete,
    /// A background job failed after exhausting its retries.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Error"))]
    Error,
}

impl ReviewStatus {
    /// All possible status values.
    pub const ALL: &'static [ReviewStatus] = &[
        Self::Pending,
        Self::QuestionsGenerated,
        Self::InProgress,
        Self::Reviewed,
        Self::Incomplete,
        Self::Error,
    ];

    /// Returns true if a background job is expected to move this review forward.
    pub fn awaits_worker(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Returns true if a manual evaluation trigger is accepted in this state.
    pub fn accepts_evaluation_trigger(&self) -> bool {
        matches!(
            self,
            Self::QuestionsGenerated | Self::InProgress | Self::Reviewed | Self::Error
        )
    }

    /// Whether moving from `self` to `next` is a legal edge of the workflow.
    ///
    /// Forward edges are the normal pipeline. The backward edges out of
    /// `Reviewed` and `Error` exist only for explicit re-triggers.
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        use ReviewStatus::*;
        matches!(
            (self, next),
            (Pending, QuestionsGenerated)
                | (Pending, Error)
                | (QuestionsGenerated, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Reviewed)
                | (InProgress, Error)
                | (Reviewed, InProgress)
                | (Error, Pending)
                | (Error, QuestionsGenerated)
                | (Error, InProgress)
        )
    }

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::QuestionsGenerated => "QuestionsGenerated",
            Self::InProgress => "InProgress",
            Self::Reviewed => "Reviewed",
            Self::Incomplete => "Incomplete",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Processing state of an uploaded design document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Stored at intake, not yet consumed by question generation.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Consumed by a successful question generation run.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "analyzed"))]
    Analyzed,
    /// The blob could not be read back or failed its checksum.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "error"))]
    Error,
}

impl Default for DocumentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Status tag stored on a score row, independent of the review status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum ScoreStatus {
    /// Row exists but no evaluation has been written to it.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Reserved; evaluation never stores a partial score.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Incomplete"))]
    Incomplete,
    /// All four dimension scores and the overall score are recorded.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Completed"))]
    Completed,
}

impl Default for ScoreStatus {
    fn default() -> Self {
        Self::Pending
    }
}
