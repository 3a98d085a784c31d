use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::queue::JobQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// `None` when the broker is disabled; jobs are then left for the stuck detector.
    pub queue: Option<Arc<dyn JobQueue>>,
    pub blobs: Arc<dyn BlobStore>,
}
