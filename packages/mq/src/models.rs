pub use broccoli_queue::{
    brokers::broker::BrokerMessage, error::BroccoliError, queue::BroccoliQueue,
};
use common::config::MqAppConfig;
use common::mq::Message;
use common::worker::Task;
use tracing::{debug, info};

use crate::error::MqError;

pub type MqQueue = BroccoliQueue;

pub struct MqConfig {
    pub url: String,
    pub pool_size: u8,
}

impl From<&MqAppConfig> for MqConfig {
    fn from(config: &MqAppConfig) -> Self {
        Self {
            url: config.url.clone(),
            pool_size: config.pool_size,
        }
    }
}

pub async fn init_mq(config: MqConfig) -> Result<MqQueue, MqError> {
    let queue = BroccoliQueue::builder(&config.url)
        .pool_connections(config.pool_size)
        .build()
        .await?;
    info!(pool_size = config.pool_size, "Connected to message broker");
    Ok(queue)
}

/// Wrap a typed message in a [`Task`] envelope and publish it.
pub async fn publish_task<M: Message>(
    mq: &MqQueue,
    queue_name: &str,
    message: &M,
) -> Result<(), MqError> {
    let task = Task::from_message(message)?;
    mq.publish(queue_name, None, &task, None).await?;
    debug!(
        queue = queue_name,
        task_id = %task.id,
        task_type = %task.task_type,
        "Published task"
    );
    Ok(())
}
