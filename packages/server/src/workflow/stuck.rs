use std::time::Duration;

use chrono::Utc;
use common::{ReviewErrorCode, ReviewStatus};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::{error, info};

use crate::config::WorkflowConfig;
use crate::consumers::mark_review_error;
use crate::entity::design_review;

use super::lock_review;

/// Run the stuck-review detector as a background task.
pub async fn run_stuck_review_detector(db: DatabaseConnection, config: WorkflowConfig) {
    let scan_interval = Duration::from_secs(config.stuck_scan_interval_secs);

    info!(
        timeout_secs = config.stuck_timeout_secs,
        scan_interval_secs = config.stuck_scan_interval_secs,
        "Starting stuck review detector"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;

        if let Err(e) = detect_stuck_reviews(&db, config.stuck_timeout_secs).await {
            error!(error = %e, "Stuck review detection failed");
        }
    }
}

/// Fail every review that has waited on a worker for longer than `timeout_secs`.
///
/// Returns the ids that were marked.
pub async fn detect_stuck_reviews(
    db: &DatabaseConnection,
    timeout_secs: u64,
) -> anyhow::Result<Vec<i32>> {
    let threshold = Utc::now() - chrono::Duration::seconds(timeout_secs as i64);
    let waiting: Vec<ReviewStatus> = ReviewStatus::ALL
        .iter()
        .copied()
        .filter(ReviewStatus::awaits_worker)
        .collect();

    let candidates: Vec<i32> = design_review::Entity::find()
        .select_only()
        .column(design_review::Column::Id)
        .filter(design_review::Column::Status.is_in(waiting))
        .filter(design_review::Column::StatusChangedAt.lt(threshold))
        .into_tuple()
        .all(db)
        .await?;

    if candidates.is_empty() {
        return Ok(vec![]);
    }

    info!(count = candidates.len(), "Found stuck reviews");

    let mut marked = Vec::new();
    for review_id in candidates {
        match handle_stuck_review(db, review_id, timeout_secs).await {
            Ok(true) => marked.push(review_id),
            Ok(false) => {}
            Err(e) => error!(review_id, error = %e, "Failed to handle stuck review"),
        }
    }

    Ok(marked)
}

async fn handle_stuck_review(
    db: &DatabaseConnection,
    review_id: i32,
    timeout_secs: u64,
) -> anyhow::Result<bool> {
    let txn = db.begin().await?;

    let Some(review) = lock_review(&txn, review_id).await? else {
        txn.rollback().await?;
        return Ok(false);
    };

    // Re-check under the lock: an outcome may have landed since the scan.
    let threshold = Utc::now() - chrono::Duration::seconds(timeout_secs as i64);
    if !review.status.awaits_worker() || review.status_changed_at >= threshold {
        txn.rollback().await?;
        return Ok(false);
    }

    let marked = mark_review_error(
        &txn,
        &review,
        ReviewErrorCode::STUCK_JOB,
        &format!(
            "Review stuck in {} for over {timeout_secs} seconds",
            review.status
        ),
    )
    .await?;
    txn.commit().await?;

    if marked {
        info!(review_id, "Marked stuck review as Error");
    }
    Ok(marked)
}
