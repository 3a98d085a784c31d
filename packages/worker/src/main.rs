use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::retry::RetryPolicy;
use common::storage::filesystem::FilesystemBlobStore;
use common::worker::Task;
use mq::{BroccoliError, BrokerMessage, MqConfig, init_mq};
use tracing::{error, info};
use worker::llm::GeminiClient;
use worker::{JobContext, MqPublisher, WorkerAppConfig, process_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = WorkerAppConfig::load().context("Failed to load config")?;
    info!("Worker starting: {}", config.worker.id);

    if config.llm.api_key.is_empty() {
        anyhow::bail!("llm.api_key is not set (REVIEWER__LLM__API_KEY)");
    }

    let store = FilesystemBlobStore::new(
        PathBuf::from(&config.storage.data_dir),
        config.storage.max_blob_size,
    )
    .await
    .context("Failed to open blob store")?;

    let generator = GeminiClient::new(&config.llm).context("Failed to build LLM client")?;

    let ctx = Arc::new(JobContext {
        generator: Arc::new(generator),
        store: Arc::new(store),
        llm_timeout: Duration::from_secs(config.llm.timeout_secs),
    });

    let mq = Arc::new(
        init_mq(MqConfig::from(&config.mq))
            .await
            .context("Failed to initialize MQ")?,
    );

    info!(
        queue_name = %config.mq.queue_name,
        result_queue_name = %config.mq.result_queue_name,
        dlq_queue_name = %config.mq.dlq_queue_name,
        max_retries = config.mq.dlq.max_retries,
        model = %config.llm.model,
        "MQ connected"
    );

    let publisher = Arc::new(MqPublisher {
        mq: Arc::clone(&mq),
        result_queue: config.mq.result_queue_name.clone(),
        dlq_queue: config.mq.dlq_queue_name.clone(),
    });
    let policy = RetryPolicy::from(&config.mq.dlq);

    let result = mq
        .process_messages(
            &config.mq.queue_name,
            Some(config.worker.batch_size),
            None,
            move |message: BrokerMessage<Task>| {
                let ctx = Arc::clone(&ctx);
                let publisher = Arc::clone(&publisher);
                async move {
                    process_task(&ctx, policy, publisher.as_ref(), message.payload)
                        .await
                        .map(|_| ())
                        .map_err(|e| BroccoliError::Publish(e.to_string()))
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Worker stopped unexpectedly");
    }

    Ok(())
}
