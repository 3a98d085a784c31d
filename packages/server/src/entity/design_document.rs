use common::DocumentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "design_document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Blob store path, e.g. `design_documents/12/architecture.pdf`.
    pub path: String,
    pub original_name: String,
    /// File extension including the dot, e.g. `.pdf`.
    pub media_type: String,
    pub size: i64,
    /// Hex SHA-256 of the bytes written at intake.
    pub content_hash: String,
    pub status: DocumentStatus,

    pub review_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id", on_delete = "Cascade")]
    pub review: HasOne<super::design_review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
