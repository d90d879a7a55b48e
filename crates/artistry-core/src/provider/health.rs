//! Liveness tracking for one provider.
//!
//! Updated by every adapter call and by explicit probes. `check_health`
//! reuses the last liveness verdict while it is younger than the configured
//! TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use artistry_types::error::ProviderError;

#[derive(Debug)]
pub struct ProviderHealth {
    pub name: String,
    /// Verdict of the most recent call or probe.
    pub healthy: bool,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    /// Wall-clock time of the last verdict, for display.
    pub last_check: Option<DateTime<Utc>>,
    /// Monotonic time of the last verdict, for TTL checks.
    checked_at: Option<Instant>,
    pub total_calls: u64,
    pub total_failures: u64,
}

impl ProviderHealth {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            last_error: None,
            last_success: None,
            last_check: None,
            checked_at: None,
            total_calls: 0,
            total_failures: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.total_calls += 1;
        self.last_success = Some(Utc::now());
        self.mark(true);
    }

    pub fn record_failure(&mut self, error: &ProviderError) {
        self.total_calls += 1;
        self.total_failures += 1;
        self.last_error = Some(error.to_string());
        // Request-shaped errors say nothing about liveness.
        let reachable = matches!(
            error,
            ProviderError::InvalidRequest(_) | ProviderError::Deserialization(_)
        );
        self.mark(reachable);
    }

    /// Store the outcome of a liveness probe.
    pub fn record_probe(&mut self, result: &Result<(), ProviderError>) {
        match result {
            Ok(()) => self.mark(true),
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.mark(false);
            }
        }
    }

    /// The last verdict, if it is younger than `ttl`.
    pub fn cached_liveness(&self, ttl: Duration) -> Option<bool> {
        self.checked_at
            .filter(|at| at.elapsed() < ttl)
            .map(|_| self.healthy)
    }

    fn mark(&mut self, healthy: bool) {
        self.healthy = healthy;
        self.last_check = Some(Utc::now());
        self.checked_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_health_has_no_verdict() {
        let health = ProviderHealth::new("gemini");
        assert!(!health.healthy);
        assert!(health.last_check.is_none());
        assert_eq!(health.cached_liveness(Duration::from_secs(300)), None);
    }

    #[test]
    fn test_failure_and_success_counters() {
        let mut health = ProviderHealth::new("gemini");
        health.record_failure(&ProviderError::Transport {
            message: "timeout".to_string(),
        });
        assert!(!health.healthy);
        assert_eq!(health.total_failures, 1);
        assert!(health.last_error.as_deref().unwrap().contains("timeout"));

        health.record_success();
        assert!(health.healthy);
        assert_eq!(health.total_calls, 2);
        assert!(health.last_success.is_some());
    }

    #[test]
    fn test_invalid_request_keeps_provider_live() {
        let mut health = ProviderHealth::new("openai");
        health.record_failure(&ProviderError::InvalidRequest("bad size".to_string()));
        assert!(health.healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_liveness_expires() {
        let mut health = ProviderHealth::new("seedance");
        health.record_probe(&Ok(()));
        assert_eq!(health.cached_liveness(Duration::from_secs(300)), Some(true));

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(health.cached_liveness(Duration::from_secs(300)), None);
    }
}
