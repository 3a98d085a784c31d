pub mod completion;
pub mod config;
pub mod dlq;
pub mod mq;
pub mod retry;
pub mod review_job;
pub mod review_outcome;
pub mod review_status;
pub mod storage;
pub mod worker;

pub use completion::{Completion, detect_completion, is_complete};
pub use config::{DlqConfig, MqAppConfig};
pub use dlq::{DlqEnvelope, DlqErrorCode, DlqMessageType, ReviewErrorCode};
pub use review_status::{DocumentStatus, ReviewStatus, ScoreStatus};
