pub mod client;
pub mod schema;

use std::time::Duration;

pub use client::{ContentPart, GeminiClient, GenerationRequest, Generator};

use crate::error::LlmError;

/// Run one generator call, giving up after `timeout`.
pub async fn generate_with_timeout(
    generator: &dyn Generator,
    request: GenerationRequest,
    timeout: Duration,
) -> Result<serde_json::Value, LlmError> {
    tokio::time::timeout(timeout, generator.generate(request))
        .await
        .map_err(|_| LlmError::Timeout(timeout.as_secs()))?
}
