//! Explicit re-triggers: manual evaluation and retry after a failure.

use chrono::Utc;
use common::review_job::{ReviewJob, new_job_id};
use common::{ReviewStatus, is_complete};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::entity::design_review;
use crate::error::AppError;

use super::answers::answer_counts;
use super::{lock_review, snapshot, transition};

pub struct TransitionOutcome {
    pub previous_status: ReviewStatus,
    pub review: design_review::Model,
    /// Job to enqueue after return, if the new status needs one.
    pub job: Option<ReviewJob>,
}

/// Queue a fresh evaluation for a fully answered review.
///
/// Accepted from `QuestionsGenerated`, `InProgress`, `Reviewed` and `Error`.
/// A new job id replaces any in-flight one, so an older evaluation outcome is
/// ignored when it arrives.
#[instrument(skip(db))]
pub async fn trigger_evaluation(
    db: &DatabaseConnection,
    review_id: i32,
) -> Result<TransitionOutcome, AppError> {
    let txn = db.begin().await?;

    let review = lock_review(&txn, review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Design review not found".into()))?;

    if !review.status.accepts_evaluation_trigger() {
        return Err(AppError::Conflict(format!(
            "Review in status {} cannot be evaluated",
            review.status
        )));
    }

    let (total, answered) = answer_counts(&txn, review_id).await?;
    if !is_complete(total, answered) {
        return Err(AppError::Validation(format!(
            "All questions must be answered before evaluation ({answered} of {total} answered)"
        )));
    }

    let previous_status = review.status;
    let job_id = new_job_id();
    let mut update = transition(&review, ReviewStatus::InProgress, Utc::now())?;
    update.active_job_id = Set(Some(job_id.clone()));
    update.error_code = Set(None);
    update.error_message = Set(None);
    let review = update.update(&txn).await?;

    let job = snapshot::evaluation_job(&txn, &review, job_id).await?;
    txn.commit().await?;

    info!(review_id, %previous_status, job_id = %job.job_id, "Manual evaluation triggered");

    Ok(TransitionOutcome {
        previous_status,
        review,
        job: Some(job),
    })
}

/// Where a failed review resumes, given its question counts.
pub fn retry_target(total: u64, answered: u64) -> ReviewStatus {
    if total == 0 {
        ReviewStatus::Pending
    } else if is_complete(total, answered) {
        ReviewStatus::InProgress
    } else {
        ReviewStatus::QuestionsGenerated
    }
}

/// Resume a review that is in `Error`.
///
/// Without questions it goes back to generation; fully answered it goes back
/// to evaluation; otherwise it waits for the remaining answers.
#[instrument(skip(db))]
pub async fn retry_review(
    db: &DatabaseConnection,
    review_id: i32,
) -> Result<TransitionOutcome, AppError> {
    let txn = db.begin().await?;

    let review = lock_review(&txn, review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Design review not found".into()))?;

    if review.status != ReviewStatus::Error {
        return Err(AppError::Conflict(format!(
            "Only reviews in Error can be retried (current status: {})",
            review.status
        )));
    }

    let (total, answered) = answer_counts(&txn, review_id).await?;
    let target = retry_target(total, answered);

    let previous_status = review.status;
    let mut update = transition(&review, target, Utc::now())?;
    update.error_code = Set(None);
    update.error_message = Set(None);

    let job_id = match target {
        ReviewStatus::Pending | ReviewStatus::InProgress => Some(new_job_id()),
        _ => None,
    };
    update.active_job_id = Set(job_id.clone());
    let review = update.update(&txn).await?;

    let job = match (target, job_id) {
        (ReviewStatus::Pending, Some(id)) => {
            Some(snapshot::generation_job(&txn, &review, id).await?)
        }
        (ReviewStatus::InProgress, Some(id)) => {
            Some(snapshot::evaluation_job(&txn, &review, id).await?)
        }
        _ => None,
    };
    txn.commit().await?;

    info!(
        review_id,
        status = %review.status,
        job_enqueued = job.is_some(),
        "Review retried"
    );

    Ok(TransitionOutcome {
        previous_status,
        review,
        job,
    })
}
