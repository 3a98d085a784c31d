use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DlqConfig;

/// A single failed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Backoff and retry budget for one job.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u8,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Delay before retrying after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u8) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl From<&DlqConfig> for RetryPolicy {
    fn from(config: &DlqConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    Retry { attempt: u8, delay: Duration },
    Exhausted,
}

/// Failures recorded for one job across its attempts.
#[derive(Debug, Clone)]
pub struct RetryHistory {
    policy: RetryPolicy,
    attempts: Vec<RetryAttempt>,
}

impl RetryHistory {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, error: impl Into<String>) -> RetryDecision {
        let attempt = self.attempts.len().saturating_add(1).min(u8::MAX as usize) as u8;
        self.attempts.push(RetryAttempt::new(attempt, error));

        if attempt <= self.policy.max_retries {
            RetryDecision::Retry {
                attempt,
                delay: self.policy.backoff(attempt),
            }
        } else {
            RetryDecision::Exhausted
        }
    }

    pub fn attempts(&self) -> &[RetryAttempt] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<RetryAttempt> {
        self.attempts
    }
}

/// Run `op` until it succeeds or the policy is exhausted, sleeping between attempts.
///
/// On exhaustion returns the last error with the full history.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    op: F,
) -> Result<T, (E, Vec<RetryAttempt>)>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_transient(policy, label, |_| false, op).await
}

/// Like [`retry_with_backoff`], but stops at the first error `is_permanent` accepts.
pub async fn retry_transient<T, E, F, Fut, P>(
    policy: RetryPolicy,
    label: &str,
    is_permanent: P,
    mut op: F,
) -> Result<T, (E, Vec<RetryAttempt>)>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut history = RetryHistory::new(policy);
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_permanent(&e) => {
                history.record_failure(e.to_string());
                return Err((e, history.into_attempts()));
            }
            Err(e) => match history.record_failure(e.to_string()) {
                RetryDecision::Retry { attempt, delay } => {
                    warn!(
                        label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted => return Err((e, history.into_attempts())),
            },
        }
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}
