use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use mq::{MqConfig, init_mq};
use server::config::AppConfig;
use server::consumers::{consume_review_outcomes, consume_worker_dlq};
use server::database::{ensure_indexes, init_db};
use server::queue::{JobQueue, MqJobQueue};
use server::state::AppState;
use server::workflow::stuck::run_stuck_review_detector;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;

    let blobs = FilesystemBlobStore::new(
        PathBuf::from(&config.storage.data_dir),
        config.storage.max_blob_size,
    )
    .await
    .context("Failed to open blob store")?;

    let queue: Option<Arc<dyn JobQueue>> = if config.mq.enabled {
        match init_mq(MqConfig::from(&config.mq)).await {
            Ok(mq) => {
                let mq = Arc::new(mq);
                info!(
                    queue_name = %config.mq.queue_name,
                    result_queue_name = %config.mq.result_queue_name,
                    dlq_queue_name = %config.mq.dlq_queue_name,
                    "MQ connected"
                );

                tokio::spawn(consume_review_outcomes(
                    db.clone(),
                    Arc::clone(&mq),
                    config.mq.result_queue_name.clone(),
                ));
                tokio::spawn(consume_worker_dlq(
                    db.clone(),
                    Arc::clone(&mq),
                    config.mq.dlq_queue_name.clone(),
                ));

                Some(Arc::new(MqJobQueue::new(mq, config.mq.queue_name.clone())))
            }
            Err(e) => {
                warn!(error = %e, "MQ unavailable, review jobs will not be queued");
                None
            }
        }
    } else {
        info!("MQ disabled");
        None
    };

    tokio::spawn(run_stuck_review_detector(db.clone(), config.workflow.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        queue,
        blobs: Arc::new(blobs),
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
