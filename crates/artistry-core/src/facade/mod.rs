//! Operation facades.
//!
//! Each facade validates its request, then runs the shared pipeline in
//! [`GenerationContext`]: cache lookup, ordered provider attempts with a
//! deterministic fallback, cache population for real provider results, and
//! exactly one audit entry per top-level call.

pub mod bio;
pub mod image;
pub mod prompt;

pub use bio::BioFacade;
pub use image::{ImageFacade, ImageVariationsFacade};
pub use prompt::{PromptAnalysisFacade, PromptRewriteFacade, PromptVariationsFacade};

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

use artistry_types::config::{CacheSettings, RoutingSettings};
use artistry_types::error::{GenerationError, ProviderError};
use artistry_types::generation::{
    FALLBACK_PROVIDER, GenerationRequest, GenerationResult, OperationKind, ProviderAttemptError,
};
use artistry_types::log::GenerationLogEntry;
use artistry_types::output::{PromptAnalysis, RewrittenPrompt};
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};
use artistry_types::status::CacheStats;

use crate::cache::{CachedValue, ResponseCache, cache_key};
use crate::fallback::FallbackOrchestrator;
use crate::log::GenerationLogger;

/// Upper bound on variations per batch request.
pub const MAX_VARIATIONS: u32 = 10;

/// One response cache per operation. Image variations share the image cache.
pub struct OperationCaches {
    pub bio: ResponseCache<String>,
    pub image: ResponseCache<String>,
    pub prompt_rewrite: ResponseCache<RewrittenPrompt>,
    pub prompt_analysis: ResponseCache<PromptAnalysis>,
    pub prompt_variations: ResponseCache<String>,
}

impl OperationCaches {
    pub fn from_settings(settings: &CacheSettings) -> Self {
        let ttl = |kind| Duration::from_secs(settings.ttl_secs(kind));
        Self {
            bio: ResponseCache::new(ttl(OperationKind::Bio)),
            image: ResponseCache::new(ttl(OperationKind::Image)),
            prompt_rewrite: ResponseCache::new(ttl(OperationKind::PromptRewrite)),
            prompt_analysis: ResponseCache::new(ttl(OperationKind::PromptAnalysis)),
            prompt_variations: ResponseCache::new(ttl(OperationKind::PromptVariations)),
        }
    }

    pub fn stats(&self) -> BTreeMap<OperationKind, CacheStats> {
        BTreeMap::from([
            (OperationKind::Bio, self.bio.stats()),
            (OperationKind::Image, self.image.stats()),
            (OperationKind::PromptRewrite, self.prompt_rewrite.stats()),
            (OperationKind::PromptAnalysis, self.prompt_analysis.stats()),
            (OperationKind::PromptVariations, self.prompt_variations.stats()),
        ])
    }

    pub fn clear_all(&self) {
        self.bio.clear();
        self.image.clear();
        self.prompt_rewrite.clear();
        self.prompt_analysis.clear();
        self.prompt_variations.clear();
    }

    pub fn purge_expired(&self) -> usize {
        self.bio.purge_expired()
            + self.image.purge_expired()
            + self.prompt_rewrite.purge_expired()
            + self.prompt_analysis.purge_expired()
            + self.prompt_variations.purge_expired()
    }
}

/// State shared by every facade.
pub struct GenerationContext {
    pub orchestrator: FallbackOrchestrator,
    pub caches: OperationCaches,
    pub logger: GenerationLogger,
    pub routing: RoutingSettings,
}

/// What a pipeline step needs besides the request itself.
pub(crate) struct Pipeline<'a, T, P, G> {
    pub cache: &'a ResponseCache<T>,
    pub capability: Capability,
    pub provider_request: ProviderRequest,
    pub parse: P,
    pub fallback: G,
}

impl GenerationContext {
    pub fn new(
        orchestrator: FallbackOrchestrator,
        caches: OperationCaches,
        logger: GenerationLogger,
        routing: RoutingSettings,
    ) -> Self {
        Self {
            orchestrator,
            caches,
            logger,
            routing,
        }
    }

    /// Caller-supplied order if non-empty, otherwise the configured routing.
    ///
    /// The order only governs provider attempts. It is not part of the cache
    /// key, so a cached payload may name a provider outside this list.
    pub fn provider_order(&self, kind: OperationKind, requested: Option<&[String]>) -> Vec<String> {
        match requested {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => self.routing.order_for(kind).to_vec(),
        }
    }

    /// Cache lookup, then ordered attempts with fallback. Does not log.
    ///
    /// Hits are keyed on parameters alone and served whichever provider
    /// produced them, even one absent from `request.providers`.
    pub(crate) async fn resolve<T, P, G>(
        &self,
        request: &GenerationRequest,
        pipeline: Pipeline<'_, T, P, G>,
    ) -> GenerationResult<T>
    where
        T: Clone,
        P: Fn(&ProviderOutput) -> Result<T, ProviderError>,
        G: FnOnce() -> T,
    {
        let key = request_key(request);
        if let Some(hit) = pipeline.cache.get(&key) {
            tracing::debug!(operation = %request.operation, provider = %hit.provider, "cache hit");
            return GenerationResult {
                output: hit.value,
                provider: hit.provider,
                generation_id: Uuid::now_v7(),
                errors: Vec::new(),
                cached: true,
            };
        }
        tracing::debug!(operation = %request.operation, "cache miss");

        let result = self
            .orchestrator
            .run(
                &request.providers,
                pipeline.capability,
                &pipeline.provider_request,
                pipeline.parse,
                pipeline.fallback,
            )
            .await;

        if !result.is_fallback() {
            pipeline.cache.insert(
                key,
                CachedValue {
                    value: result.output.clone(),
                    provider: result.provider.clone(),
                },
            );
        }
        result
    }

    /// Record the audit entry for a single-result call.
    pub(crate) fn log_result<T: Serialize>(
        &self,
        request: &GenerationRequest,
        result: &GenerationResult<T>,
        started: Instant,
    ) {
        self.log(LogRecord {
            request,
            id: result.generation_id,
            provider: &result.provider,
            result: serde_json::to_value(&result.output).ok(),
            errors: &result.errors,
            success: !result.is_fallback(),
            cached: result.cached,
            started,
        });
    }

    pub(crate) fn log(&self, record: LogRecord<'_>) {
        let duration_ms = record.started.elapsed().as_millis() as u64;
        let error = (!record.success).then(|| summarize_errors(record.errors));

        let span = tracing::Span::current();
        span.record("provider", record.provider);
        span.record("cached", record.cached);

        tracing::info!(
            operation = %record.request.operation,
            provider = %record.provider,
            cached = record.cached,
            success = record.success,
            duration_ms,
            "generation completed"
        );

        self.logger.record(GenerationLogEntry {
            id: record.id,
            user_id: record.request.user_id.clone(),
            operation: record.request.operation,
            provider: record.provider.to_string(),
            parameters: record.request.parameters.clone(),
            result: record.result,
            error,
            duration_ms,
            success: record.success,
            cached: record.cached,
            created_at: chrono::Utc::now(),
        });
    }
}

pub(crate) struct LogRecord<'a> {
    pub request: &'a GenerationRequest,
    pub id: Uuid,
    pub provider: &'a str,
    pub result: Option<serde_json::Value>,
    pub errors: &'a [ProviderAttemptError],
    pub success: bool,
    pub cached: bool,
    pub started: Instant,
}

/// Cache key of a request, with the variation index folded in.
pub(crate) fn request_key(request: &GenerationRequest) -> String {
    match request.variation {
        Some(index) => cache_key(
            request.operation,
            &serde_json::json!({ "parameters": request.parameters, "variation": index }),
        ),
        None => cache_key(request.operation, &request.parameters),
    }
}

/// Provider reported for a batch: the common provider, or "mixed".
pub(crate) fn batch_provider<'a>(mut providers: impl Iterator<Item = &'a str>) -> String {
    let Some(first) = providers.next() else {
        return FALLBACK_PROVIDER.to_string();
    };
    if providers.all(|p| p == first) {
        first.to_string()
    } else {
        "mixed".to_string()
    }
}

fn summarize_errors(errors: &[ProviderAttemptError]) -> String {
    if errors.is_empty() {
        return "no provider available".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::missing(field));
    }
    Ok(())
}

pub(crate) fn require_count(count: u32) -> Result<(), GenerationError> {
    if count == 0 || count > MAX_VARIATIONS {
        return Err(GenerationError::Validation {
            field: "count".to_string(),
            message: format!("must be between 1 and {MAX_VARIATIONS}"),
        });
    }
    Ok(())
}
