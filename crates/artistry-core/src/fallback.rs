//! Ordered multi-provider fallback.
//!
//! [`first_success`] is the reduction everything else builds on: it runs
//! `(provider, thunk)` pairs strictly in order and stops at the first
//! success. [`FallbackOrchestrator`] feeds it one thunk per provider in the
//! preference list and turns exhaustion into a deterministic local result.

use std::future::Future;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use artistry_types::error::ProviderError;
use artistry_types::generation::{FALLBACK_PROVIDER, GenerationResult, ProviderAttemptError};
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use crate::provider::ProviderRegistry;
use crate::rate_limit::RateLimiter;

/// A successful attempt and the failures recorded before it.
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: T,
    pub provider: String,
    pub errors: Vec<ProviderAttemptError>,
}

/// Run attempts in order; return the first success or every failure.
///
/// The iterator is consumed lazily, so no attempt starts before the previous
/// one has finished.
pub async fn first_success<T, I, F, Fut>(
    attempts: I,
) -> Result<Attempted<T>, Vec<ProviderAttemptError>>
where
    I: IntoIterator<Item = (String, F)>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut errors = Vec::new();

    for (provider, attempt) in attempts {
        match attempt().await {
            Ok(value) => {
                return Ok(Attempted {
                    value,
                    provider,
                    errors,
                });
            }
            Err(err) => {
                tracing::warn!(provider = %provider, error = %err, "provider attempt failed");
                errors.push(ProviderAttemptError::new(provider, &err));
            }
        }
    }

    Err(errors)
}

/// Walks a provider preference list through the registry and local limiter.
pub struct FallbackOrchestrator {
    registry: Arc<ProviderRegistry>,
    limiter: Arc<RateLimiter>,
}

impl FallbackOrchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, limiter: Arc<RateLimiter>) -> Self {
        Self { registry, limiter }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Try every provider in `order`; `parse` turns raw output into the
    /// payload, and a parse failure counts as that provider's failure.
    pub async fn attempt<T, P>(
        &self,
        order: &[String],
        capability: Capability,
        request: &ProviderRequest,
        parse: P,
    ) -> Result<Attempted<T>, Vec<ProviderAttemptError>>
    where
        P: Fn(&ProviderOutput) -> Result<T, ProviderError>,
    {
        let parse = &parse;
        first_success(order.iter().map(|name| {
            (name.clone(), move || {
                self.try_provider(name, capability, request, parse)
            })
        }))
        .await
    }

    /// [`Self::attempt`], degrading to `fallback()` when every provider fails.
    ///
    /// Never fails: the result names `"fallback"` as its provider and
    /// carries every attempt error.
    pub async fn run<T, P, G>(
        &self,
        order: &[String],
        capability: Capability,
        request: &ProviderRequest,
        parse: P,
        fallback: G,
    ) -> GenerationResult<T>
    where
        P: Fn(&ProviderOutput) -> Result<T, ProviderError>,
        G: FnOnce() -> T,
    {
        match self.attempt(order, capability, request, parse).await {
            Ok(attempted) => GenerationResult {
                output: attempted.value,
                provider: attempted.provider,
                generation_id: Uuid::now_v7(),
                errors: attempted.errors,
                cached: false,
            },
            Err(errors) => {
                tracing::warn!(
                    providers = ?order,
                    failures = errors.len(),
                    "all providers exhausted, using fallback"
                );
                GenerationResult {
                    output: fallback(),
                    provider: FALLBACK_PROVIDER.to_string(),
                    generation_id: Uuid::now_v7(),
                    errors,
                    cached: false,
                }
            }
        }
    }

    async fn try_provider<T, P>(
        &self,
        name: &str,
        capability: Capability,
        request: &ProviderRequest,
        parse: &P,
    ) -> Result<T, ProviderError>
    where
        P: Fn(&ProviderOutput) -> Result<T, ProviderError>,
    {
        let adapter = self
            .registry
            .get(name)
            .ok_or_else(|| ProviderError::NotConfigured(name.to_string()))?;

        if adapter.capability() != capability {
            return Err(ProviderError::Unsupported {
                provider: name.to_string(),
                capability: capability.to_string(),
            });
        }
        if !adapter.is_configured() {
            return Err(ProviderError::NotConfigured(name.to_string()));
        }
        if !self.limiter.try_acquire(name) {
            return Err(ProviderError::LocalRateLimit {
                provider: name.to_string(),
            });
        }

        let output = adapter
            .generate(request)
            .instrument(tracing::info_span!("provider_attempt", provider = %name))
            .await?;
        parse(&output)
    }
}
