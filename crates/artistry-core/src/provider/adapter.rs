//! Uniform wrapper around one generation backend.
//!
//! An adapter owns its backend, applies the shared [`RetryPolicy`] to every
//! call and keeps a [`ProviderHealth`] record. It never tries a sibling
//! provider; ordered fallback belongs to the orchestrator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};
use artistry_types::status::{ProviderAvailability, QuotaInfo};

use super::box_provider::BoxGenerationProvider;
use super::health::ProviderHealth;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

pub struct ProviderAdapter {
    provider: BoxGenerationProvider,
    retry: RetryPolicy,
    limiter: Arc<RateLimiter>,
    health: Mutex<ProviderHealth>,
    health_ttl: Duration,
}

impl ProviderAdapter {
    pub fn new(
        provider: BoxGenerationProvider,
        retry: RetryPolicy,
        limiter: Arc<RateLimiter>,
        health_ttl: Duration,
    ) -> Self {
        let health = Mutex::new(ProviderHealth::new(provider.name()));
        Self {
            provider,
            retry,
            limiter,
            health,
            health_ttl,
        }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn capability(&self) -> Capability {
        self.provider.capability()
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Call the backend under the retry policy.
    ///
    /// Local admission is the caller's concern; retries inside one call do
    /// not consume extra rate-limit slots.
    pub async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        if !self.is_configured() {
            let err = ProviderError::AuthenticationFailed;
            self.health().record_failure(&err);
            return Err(err);
        }

        let result = self
            .retry
            .run(self.name(), || self.provider.generate(request))
            .await;

        match &result {
            Ok(_) => self.health().record_success(),
            Err(err) => self.health().record_failure(err),
        }
        result
    }

    /// Liveness, reusing the last verdict while it is younger than the TTL.
    pub async fn check_health(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        if let Some(healthy) = self.health().cached_liveness(self.health_ttl) {
            return healthy;
        }

        let result = self.provider.probe().await;
        if let Err(err) = &result {
            tracing::warn!(provider = %self.name(), error = %err, "health probe failed");
        }
        self.health().record_probe(&result);
        result.is_ok()
    }

    pub async fn availability(&self) -> ProviderAvailability {
        let healthy = self.check_health().await;
        let health = self.health();
        ProviderAvailability {
            name: self.name().to_string(),
            capability: self.capability(),
            available: self.is_configured(),
            healthy,
            last_check: health.last_check,
            last_error: health.last_error.clone(),
        }
    }

    /// Read-only view of this provider's local rate-limit window.
    pub fn quota_info(&self) -> QuotaInfo {
        self.limiter.quota(self.name())
    }

    fn health(&self) -> MutexGuard<'_, ProviderHealth> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("provider", &self.provider)
            .field("retry", &self.retry)
            .field("health_ttl", &self.health_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimit;
    use crate::test_support::{ScriptedProvider, transport};

    fn adapter(provider: ScriptedProvider, max_retries: u32) -> ProviderAdapter {
        ProviderAdapter::new(
            BoxGenerationProvider::new(provider),
            RetryPolicy::new(max_retries, Duration::from_millis(10)),
            Arc::new(RateLimiter::new(RateLimit::default())),
            Duration::from_secs(300),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_retries_transport_errors() {
        let provider = ScriptedProvider::ok("gemini", Capability::Text, "hello")
            .then(Err(transport("reset")))
            .then(Err(transport("reset")));
        let probe = provider.handle();
        let adapter = adapter(provider, 3);

        let output = adapter.generate(&ProviderRequest::text("hi")).await.unwrap();
        assert_eq!(output.content, "hello");
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_backend_fails_fast() {
        let provider = ScriptedProvider::ok("openai", Capability::Text, "x").unconfigured();
        let probe = provider.handle();
        let adapter = adapter(provider, 3);

        let err = adapter.generate(&ProviderRequest::text("hi")).await.unwrap_err();
        assert_eq!(err, ProviderError::AuthenticationFailed);
        assert_eq!(probe.calls(), 0);
        assert!(!adapter.check_health().await);
        assert_eq!(probe.probes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_health_caches_probe_within_ttl() {
        let provider = ScriptedProvider::ok("seedance", Capability::Image, "https://x/img.png");
        let probe = provider.handle();
        let adapter = adapter(provider, 0);

        assert!(adapter.check_health().await);
        assert!(adapter.check_health().await);
        assert_eq!(probe.probes(), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(adapter.check_health().await);
        assert_eq!(probe.probes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_call_counts_as_liveness() {
        let provider = ScriptedProvider::failing("gemini", Capability::Text, transport("down"))
            .with_probe(Ok(()));
        let probe = provider.handle();
        let adapter = adapter(provider, 0);

        assert!(adapter.generate(&ProviderRequest::text("hi")).await.is_err());
        let status = adapter.availability().await;
        assert!(status.available);
        assert!(!status.healthy);
        assert!(status.last_check.is_some());
        assert!(status.last_error.unwrap().contains("down"));
        assert_eq!(probe.probes(), 0);
    }

    #[test]
    fn test_quota_info_reads_shared_limiter() {
        let limiter = Arc::new(RateLimiter::new(RateLimit {
            limit: 2,
            window: Duration::from_secs(60),
        }));
        let adapter = ProviderAdapter::new(
            BoxGenerationProvider::new(ScriptedProvider::ok("gemini", Capability::Text, "x")),
            RetryPolicy::none(),
            limiter.clone(),
            Duration::from_secs(300),
        );
        assert!(limiter.try_acquire("gemini"));
        let quota = adapter.quota_info();
        assert_eq!(quota.limit, 2);
        assert_eq!(quota.remaining, 1);
    }
}
