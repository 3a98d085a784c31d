use common::review_outcome::QuestionCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "probing_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub question: String,
    /// `None` until answered. An empty string counts as answered.
    #[sea_orm(column_type = "Text", nullable)]
    pub answer: Option<String>,
    pub difficulty: i32,
    pub category: QuestionCategory,
    /// Order in which the generator produced the question.
    pub position: i32,

    #[sea_orm(indexed)]
    pub review_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id", on_delete = "Cascade")]
    pub review: HasOne<super::design_review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
