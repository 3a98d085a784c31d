pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod processor;
pub mod prompts;

pub use config::{LlmConfig, StorageConfig, WorkerAppConfig, WorkerConfig};
pub use error::{JobError, LlmError, Result};
pub use handlers::JobContext;
pub use processor::{Disposition, MqPublisher, OutcomePublisher, process_task};
