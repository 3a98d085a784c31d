use std::sync::Arc;

use chrono::Utc;
use common::{DlqEnvelope, DocumentStatus};
use mq::{BroccoliError, BrokerMessage, Mq};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::{error, info, instrument, warn};

use super::mark_review_error;
use crate::entity::design_document;
use crate::workflow::lock_review;

pub async fn consume_worker_dlq(db: DatabaseConnection, mq: Arc<Mq>, queue_name: String) {
    info!(queue = %queue_name, "Starting worker DLQ consumer");

    let result = mq
        .process_messages(
            &queue_name,
            None,
            None,
            move |message: BrokerMessage<DlqEnvelope>| {
                let db = db.clone();
                async move {
                    let envelope = message.payload;
                    let message_id = envelope.message_id.clone();

                    if let Err(e) = handle_dead_letter(&db, &envelope).await {
                        error!(
                            review_id = envelope.review_id,
                            message_id = %message_id,
                            error = %e,
                            "Failed to record dead-lettered job on review"
                        );
                        return Err(BroccoliError::Job(e.to_string()));
                    }
                    Ok(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Worker DLQ consumer stopped unexpectedly");
    }
}

/// Persist a dead-lettered job as an `Error` on its review.
///
/// Returns `true` if the review was marked. Envelopes without a review id,
/// for deleted reviews, or for a job the review no longer waits on are
/// logged and dropped. A document the worker could not read is marked
/// `Error` first so the next snapshot leaves it out.
#[instrument(skip_all, fields(message_id = %envelope.message_id, review_id = envelope.review_id))]
pub async fn handle_dead_letter(
    db: &DatabaseConnection,
    envelope: &DlqEnvelope,
) -> anyhow::Result<bool> {
    let Some(review_id) = envelope.review_id else {
        info!(
            error_code = %envelope.error_code,
            "Skipping review status update: review_id unknown"
        );
        return Ok(false);
    };

    let txn = db.begin().await?;

    let Some(review) = lock_review(&txn, review_id).await? else {
        info!("Review no longer exists, dropping dead letter");
        txn.rollback().await?;
        return Ok(false);
    };

    if let Some(document_id) = envelope.document_id {
        mark_document_error(&txn, review_id, document_id).await?;
    }

    if let Some(active) = review.active_job_id.as_deref()
        && active != envelope.message_id
    {
        info!(active_job_id = active, "Dead letter is for a superseded job, skipping");
        txn.commit().await?;
        return Ok(false);
    }

    let marked = mark_review_error(
        &txn,
        &review,
        envelope.review_error_code(),
        &envelope.error_message,
    )
    .await?;
    txn.commit().await?;

    info!(
        marked,
        error_code = %envelope.error_code,
        attempts = envelope.retry_history.len(),
        "Processed worker dead letter"
    );

    Ok(marked)
}

async fn mark_document_error<C: ConnectionTrait>(
    conn: &C,
    review_id: i32,
    document_id: i32,
) -> Result<(), DbErr> {
    let result = design_document::Entity::update_many()
        .col_expr(
            design_document::Column::Status,
            Expr::value(DocumentStatus::Error),
        )
        .col_expr(design_document::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(design_document::Column::Id.eq(document_id))
        .filter(design_document::Column::ReviewId.eq(review_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        info!(document_id, "Unreadable document not found on review");
    } else {
        warn!(document_id, "Document marked as Error");
    }
    Ok(())
}
