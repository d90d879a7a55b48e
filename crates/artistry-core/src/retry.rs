//! Bounded retry with exponential backoff and remote rate-limit cooldown.
//!
//! - `Transport` errors are retried up to `max_retries` times, waiting
//!   `base * 2^attempt` before each retry.
//! - A remote `RateLimited` signal waits the reported reset time (or the
//!   fixed cooldown when none is reported), capped at `max_cooldown`, then
//!   allows exactly one more attempt. A second signal is returned.
//! - Every other error is returned immediately.
//!
//! Delays go through `tokio::time::sleep`, so tests drive them with a paused
//! clock.

use std::future::Future;
use std::time::Duration;

use artistry_types::config::RetrySettings;
use artistry_types::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub rate_limit_cooldown: Duration,
    pub max_cooldown: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        let defaults = RetrySettings::default();
        Self {
            max_retries,
            base_delay,
            rate_limit_cooldown: Duration::from_millis(defaults.rate_limit_cooldown_ms),
            max_cooldown: Duration::from_millis(defaults.max_cooldown_ms),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration, max_cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self.max_cooldown = max_cooldown;
        self
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_retries, Duration::from_millis(settings.base_delay_ms)).with_cooldown(
            Duration::from_millis(settings.rate_limit_cooldown_ms),
            Duration::from_millis(settings.max_cooldown_ms),
        )
    }

    /// A policy that never waits and never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO).with_cooldown(Duration::ZERO, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Wait applied after a remote rate-limit signal.
    pub fn cooldown(&self, retry_after_ms: Option<u64>) -> Duration {
        retry_after_ms
            .map(Duration::from_millis)
            .unwrap_or(self.rate_limit_cooldown)
            .min(self.max_cooldown)
    }

    /// Run `op` until it succeeds or the policy gives up.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut retries = 0u32;
        let mut cooled_down = false;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.max_retries => {
                    let delay = self.backoff_delay(retries);
                    retries += 1;
                    tracing::debug!(
                        provider = label,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transport error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(ProviderError::RateLimited { retry_after_ms }) if !cooled_down => {
                    let delay = self.cooldown(retry_after_ms);
                    cooled_down = true;
                    tracing::warn!(
                        provider = label,
                        delay_ms = delay.as_millis() as u64,
                        "provider signalled rate limit, cooling down"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}
