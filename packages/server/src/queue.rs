use std::sync::Arc;

use async_trait::async_trait;
use common::review_job::ReviewJob;
use mq::{Mq, MqError, publish_task};
use tracing::{debug, info, instrument, warn};

use crate::state::AppState;

/// Outbound side of the review job queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &ReviewJob) -> Result<(), MqError>;
}

/// Publishes review jobs to the broker as `Task` envelopes.
pub struct MqJobQueue {
    mq: Arc<Mq>,
    queue_name: String,
}

impl MqJobQueue {
    pub fn new(mq: Arc<Mq>, queue_name: impl Into<String>) -> Self {
        Self {
            mq,
            queue_name: queue_name.into(),
        }
    }
}

#[async_trait]
impl JobQueue for MqJobQueue {
    async fn enqueue(&self, job: &ReviewJob) -> Result<(), MqError> {
        publish_task(&self.mq, &self.queue_name, job).await
    }
}

/// Enqueue a job after its transaction committed.
///
/// Publish failures are logged, not returned. A review whose job was lost
/// stays in a worker-owned state until the stuck detector fails it.
#[instrument(skip(state, job), fields(review_id = job.review_id, job_id = %job.job_id, kind = job.kind.as_str()))]
pub async fn enqueue_review_job(state: &AppState, job: &ReviewJob) {
    let Some(ref queue) = state.queue else {
        debug!("MQ unavailable, skipping enqueue");
        return;
    };

    match queue.enqueue(job).await {
        Ok(()) => info!(documents = job.documents.len(), "Review job enqueued"),
        Err(e) => warn!(error = %e, "Failed to enqueue review job"),
    }
}
