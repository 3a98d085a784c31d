use common::ReviewStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "design_review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub problem_description: String,
    #[sea_orm(column_type = "Text")]
    pub proposed_architecture: String,
    #[sea_orm(column_type = "Text")]
    pub design_tradeoffs: String,
    #[sea_orm(column_type = "Text")]
    pub scalability: String,
    #[sea_orm(column_type = "Text")]
    pub security_measures: String,
    #[sea_orm(column_type = "Text")]
    pub maintainability: String,

    #[sea_orm(indexed)]
    pub status: ReviewStatus,
    /// 0-100, set when the review reaches `Reviewed`.
    pub overall_score: Option<i32>,

    /// Job whose outcome this review currently accepts.
    pub active_job_id: Option<String>,
    /// Number of background failures recorded against this review.
    pub retry_count: i32,
    pub error_code: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub candidate_id: i32,
    #[sea_orm(belongs_to, from = "candidate_id", to = "id", on_delete = "Cascade")]
    pub candidate: HasOne<super::candidate::Entity>,

    #[sea_orm(has_many)]
    pub documents: HasMany<super::design_document::Entity>,
    #[sea_orm(has_many)]
    pub questions: HasMany<super::probing_question::Entity>,
    #[sea_orm(has_one)]
    pub score: HasOne<super::design_review_score::Entity>,

    pub submitted_at: DateTimeUtc,
    pub status_changed_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
