//! Blob bookkeeping for stored design documents.

use common::storage::{BlobPath, BlobStore};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use tracing::{debug, warn};

use crate::entity::design_document;

/// Blob paths of every document attached to the given reviews.
pub async fn document_paths<C: ConnectionTrait>(
    db: &C,
    review_ids: impl IntoIterator<Item = i32>,
) -> Result<Vec<String>, DbErr> {
    design_document::Entity::find()
        .select_only()
        .column(design_document::Column::Path)
        .filter(design_document::Column::ReviewId.is_in(review_ids))
        .into_tuple()
        .all(db)
        .await
}

/// Delete the blobs behind `paths` that no remaining document row refers to.
///
/// Call after the owning rows are gone. Storage failures are logged and
/// skipped; the number of blobs actually removed is returned.
pub async fn remove_unreferenced_blobs<C: ConnectionTrait>(
    db: &C,
    blobs: &dyn BlobStore,
    paths: Vec<String>,
) -> Result<usize, DbErr> {
    let mut removed = 0;
    for path in paths {
        let still_used = design_document::Entity::find()
            .filter(design_document::Column::Path.eq(path.as_str()))
            .count(db)
            .await?
            > 0;
        if still_used {
            debug!(path = %path, "Blob still referenced, keeping");
            continue;
        }
        let result = match BlobPath::parse(&path) {
            Ok(blob_path) => blobs.delete(&blob_path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => warn!(path = %path, error = %e, "Failed to remove document blob"),
        }
    }
    Ok(removed)
}
