use std::sync::Arc;

use async_trait::async_trait;
use common::mq::Message;
use common::retry::{RetryPolicy, retry_transient};
use common::review_job::ReviewJob;
use common::review_outcome::ReviewOutcome;
use common::worker::Task;
use common::{DlqEnvelope, DlqErrorCode, DlqMessageType};
use tracing::{error, info, instrument};

use crate::error::JobError;
use crate::handlers::{JobContext, handle_job};

/// Where the worker sends finished outcomes and dead letters.
#[async_trait]
pub trait OutcomePublisher: Send + Sync {
    async fn publish_outcome(&self, outcome: &ReviewOutcome) -> Result<(), JobError>;
    async fn publish_dead_letter(&self, envelope: &DlqEnvelope) -> Result<(), JobError>;
}

/// Publishes to the result and DLQ queues on the broker.
pub struct MqPublisher {
    pub mq: Arc<mq::Mq>,
    pub result_queue: String,
    pub dlq_queue: String,
}

#[async_trait]
impl OutcomePublisher for MqPublisher {
    async fn publish_outcome(&self, outcome: &ReviewOutcome) -> Result<(), JobError> {
        self.mq
            .publish(&self.result_queue, None, outcome, None)
            .await
            .map_err(|e| JobError::Publish(format!("Failed to publish ReviewOutcome: {e}")))?;
        Ok(())
    }

    async fn publish_dead_letter(&self, envelope: &DlqEnvelope) -> Result<(), JobError> {
        self.mq
            .publish(&self.dlq_queue, None, envelope, None)
            .await
            .map_err(|e| JobError::Publish(format!("Failed to publish to DLQ: {e}")))?;
        Ok(())
    }
}

/// How a task left the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Completed,
    DeadLettered,
}

/// Process one queued task end to end.
///
/// Undecodable payloads are dead-lettered immediately, as are documents that
/// are missing or fail their checksum. Other failures are retried with backoff
/// and dead-lettered once the policy is exhausted. An error is returned only
/// when the dead letter itself cannot be published.
#[instrument(skip_all, fields(task_id = %task.id))]
pub async fn process_task(
    ctx: &JobContext,
    policy: RetryPolicy,
    publisher: &dyn OutcomePublisher,
    task: Task,
) -> Result<Disposition, JobError> {
    let job: ReviewJob = match task.decode() {
        Ok(job) => job,
        Err(e) => {
            error!(task_type = %task.task_type, error = %e, "Failed to decode ReviewJob");
            let envelope = DlqEnvelope {
                message_id: task.id.clone(),
                message_type: DlqMessageType::ReviewJob,
                review_id: task.review_id_hint(),
                job_kind: task
                    .payload
                    .get("kind")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                document_id: None,
                payload: task.payload,
                error_code: DlqErrorCode::DeserializationError,
                error_message: format!("Failed to decode ReviewJob: {e}"),
                retry_history: vec![],
            };
            publisher.publish_dead_letter(&envelope).await?;
            return Ok(Disposition::DeadLettered);
        }
    };

    info!(
        review_id = job.review_id,
        job_id = %job.job_id,
        kind = job.kind.as_str(),
        "Processing review job"
    );

    let job_ref = &job;
    let is_permanent = |e: &JobError| e.unavailable_document().is_some();
    let label = ReviewJob::message_type();
    let result = retry_transient(policy, label, is_permanent, move || async move {
        let outcome = handle_job(ctx, job_ref).await?;
        publisher.publish_outcome(&outcome).await?;
        info!(
            review_id = outcome.review_id,
            outcome = outcome.kind.as_str(),
            "Published outcome"
        );
        Ok::<_, JobError>(())
    })
    .await;

    match result {
        Ok(()) => Ok(Disposition::Completed),
        Err((e, history)) => {
            let document_id = e.unavailable_document();
            let error_code = if document_id.is_some() {
                DlqErrorCode::DocumentUnavailable
            } else {
                DlqErrorCode::MaxRetriesExceeded
            };
            error!(
                review_id = job.review_id,
                job_id = %job.job_id,
                attempts = history.len(),
                error_code = %error_code,
                error = %e,
                "Giving up on job, sending to DLQ"
            );

            let envelope = DlqEnvelope {
                message_id: job.job_id.clone(),
                message_type: DlqMessageType::ReviewJob,
                review_id: Some(job.review_id),
                job_kind: Some(job.kind.as_str().to_string()),
                document_id,
                payload: task.payload,
                error_code,
                error_message: e.to_string(),
                retry_history: history,
            };
            publisher.publish_dead_letter(&envelope).await?;
            Ok(Disposition::DeadLettered)
        }
    }
}
