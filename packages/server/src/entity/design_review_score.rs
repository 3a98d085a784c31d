use common::ScoreStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "design_review_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub technical_depth: i32,
    pub system_design: i32,
    pub tradeoff: i32,
    pub ownership: i32,
    /// Mean of the four sub-scores, 1.0-5.0.
    pub overall_score: f64,
    #[sea_orm(column_type = "Text")]
    pub feedback_summary: String,
    pub status: ScoreStatus,
    pub reviewed_at: Option<DateTimeUtc>,

    #[sea_orm(unique)]
    pub review_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id", on_delete = "Cascade")]
    pub review: HasOne<super::design_review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
