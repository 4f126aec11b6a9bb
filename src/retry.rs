use crate::config::LlmConfig;
use crate::error::AppError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single backoff sleep
const MAX_DELAY_MS: u64 = 10_000;

/// Exponential backoff with jitter for calls to the LLM provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_base_delay_ms,
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`
    /// plus up to 50% jitter, capped at `MAX_DELAY_MS`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(1u64 << retry.saturating_sub(1).min(16));
        let jitter = if exp > 0 {
            rand::thread_rng().gen_range(0..=exp / 2)
        } else {
            0
        };
        Duration::from_millis(exp.saturating_add(jitter).min(MAX_DELAY_MS))
    }
}

/// Run `request_fn` until it succeeds, fails with a non-transient error, or
/// the retry budget is spent. The last error is returned.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, mut request_fn: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut retry = 0;
    loop {
        match request_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if retry < policy.max_retries && is_transient(&e) => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    retry = retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient LLM failure, retrying"
                );
                crate::metrics::record_llm_retry(retry);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Determine if an error is worth retrying
///
/// ## Transient (returns true):
/// - Connection failures and request timeouts
/// - HTTP 429 and 5xx from the provider
///
/// ## Not transient (returns false):
/// - Other 4xx (bad key, bad request)
/// - Malformed or invalid model output
/// - Local errors
pub fn is_transient(error: &AppError) -> bool {
    match error {
        AppError::HttpRequest(e) => {
            if e.is_connect() || e.is_timeout() {
                return true;
            }
            if let Some(status) = e.status() {
                return status.is_server_error() || status.as_u16() == 429;
            }
            false
        }

        AppError::UpstreamError { status, .. } => {
            status.is_server_error() || status.as_u16() == 429
        }

        AppError::ConfigError(_)
        | AppError::BadRequest(_)
        | AppError::Validation(_)
        | AppError::LlmResponse(_)
        | AppError::StorageError(_)
        | AppError::RenderError(_)
        | AppError::InternalError(_) => false,
    }
}
