pub mod review_result;
pub mod worker_dlq;

pub use review_result::consume_review_outcomes;
pub use worker_dlq::consume_worker_dlq;

use chrono::Utc;
use common::ReviewStatus;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::{info, warn};

use crate::entity::design_review;
use crate::workflow::transition;

/// Move a locked review to `Error`, recording the failure.
///
/// Returns `false` without writing when the review is not in a state a
/// background failure can apply to (it already moved on).
pub async fn mark_review_error<C: ConnectionTrait>(
    conn: &C,
    review: &design_review::Model,
    error_code: &str,
    error_message: &str,
) -> anyhow::Result<bool> {
    let mut update = match transition(review, ReviewStatus::Error, Utc::now()) {
        Ok(update) => update,
        Err(e) => {
            info!(review_id = review.id, error = %e, "Not marking review as Error");
            return Ok(false);
        }
    };
    update.retry_count = Set(review.retry_count + 1);
    update.error_code = Set(Some(error_code.to_string()));
    update.error_message = Set(Some(error_message.to_string()));
    update.active_job_id = Set(None);
    update.update(conn).await?;

    warn!(
        review_id = review.id,
        error_code,
        retry_count = review.retry_count + 1,
        "Review marked as Error"
    );
    Ok(true)
}
