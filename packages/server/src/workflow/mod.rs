//! Review workflow: intake, answer collection, re-triggers and supervision.
//!
//! Every status change goes through [`transition`], which rejects edges that
//! [`ReviewStatus::can_transition_to`] does not allow. Callers hold the review
//! row lock (see [`lock_review`]) for the whole read-check-write sequence.

pub mod answers;
pub mod documents;
pub mod intake;
pub mod snapshot;
pub mod stuck;
pub mod transitions;

use chrono::{DateTime, Utc};
use common::ReviewStatus;
use sea_orm::sea_query::LockType;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QuerySelect, Set};
use thiserror::Error;

use crate::entity::design_review;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot move review from {from} to {to}")]
pub struct IllegalTransition {
    pub from: ReviewStatus,
    pub to: ReviewStatus,
}

impl From<IllegalTransition> for AppError {
    fn from(err: IllegalTransition) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// Build the update for moving `review` to `next`.
///
/// Only the id, status and timestamps are set; callers add the fields that
/// belong to the specific edge.
pub fn transition(
    review: &design_review::Model,
    next: ReviewStatus,
    now: DateTime<Utc>,
) -> Result<design_review::ActiveModel, IllegalTransition> {
    if !review.status.can_transition_to(next) {
        return Err(IllegalTransition {
            from: review.status,
            to: next,
        });
    }
    Ok(design_review::ActiveModel {
        id: Set(review.id),
        status: Set(next),
        status_changed_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
}

/// Find a review by ID or return 404.
pub async fn find_review<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<design_review::Model, AppError> {
    design_review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Design review not found".into()))
}

/// Load a review with `SELECT ... FOR UPDATE`.
pub async fn lock_review<C: ConnectionTrait>(
    txn: &C,
    id: i32,
) -> Result<Option<design_review::Model>, DbErr> {
    design_review::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await
}
