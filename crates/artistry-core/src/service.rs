//! GenerationService -- the entry point the application layer calls.
//!
//! Owns the rate limiter, provider registry, caches and log writer, and
//! exposes every operation facade plus the observability reads. Each
//! service instance has its own state; nothing here is global.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use artistry_types::config::OrchestratorSettings;
use artistry_types::error::GenerationError;
use artistry_types::generation::OperationKind;
use artistry_types::output::{
    AnalysisOutput, BioOutput, ImageOutput, ImageVariationsOutput, PromptVariationsOutput,
    RewriteOutput,
};
use artistry_types::request::{
    ArtistInfo, BioOptions, ImageOptions, ImageRequest, PromptOptions, PromptRequest,
};
use artistry_types::status::{CacheStats, ProviderAvailability, QuotaInfo};

use crate::facade::{
    BioFacade, GenerationContext, ImageFacade, ImageVariationsFacade, OperationCaches,
    PromptAnalysisFacade, PromptRewriteFacade, PromptVariationsFacade,
};
use crate::fallback::FallbackOrchestrator;
use crate::log::{GenerationLogStore, GenerationLogger};
use crate::provider::{BoxGenerationProvider, ProviderAdapter, ProviderRegistry};
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::retry::RetryPolicy;

pub struct GenerationService {
    context: Arc<GenerationContext>,
    registry: Arc<ProviderRegistry>,
    limiter: Arc<RateLimiter>,
    bio: BioFacade,
    image: ImageFacade,
    image_variations: ImageVariationsFacade,
    prompt_rewrite: PromptRewriteFacade,
    prompt_analysis: PromptAnalysisFacade,
    prompt_variations: PromptVariationsFacade,
}

impl GenerationService {
    /// Wire providers, limiter, caches and the log writer from settings.
    ///
    /// Must be called inside a tokio runtime (the log writer is spawned).
    pub fn new<S: GenerationLogStore + 'static>(
        settings: &OrchestratorSettings,
        providers: Vec<BoxGenerationProvider>,
        log_store: Arc<S>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(RateLimit::default()));
        for provider in &settings.providers {
            if provider.window_secs == 0 {
                tracing::warn!(
                    provider = %provider.name,
                    "window_secs = 0 is not a usable rate-limit window, using the default"
                );
            }
            limiter.set_limit(
                provider.name.clone(),
                RateLimit {
                    limit: provider.requests_per_window,
                    window: provider.window(),
                },
            );
        }

        let retry = RetryPolicy::from_settings(&settings.retry);
        let health_ttl = Duration::from_secs(settings.health_check_ttl_secs);
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(ProviderAdapter::new(
                provider,
                retry.clone(),
                limiter.clone(),
                health_ttl,
            ));
        }
        let registry = Arc::new(registry);

        tracing::info!(
            providers = ?registry.names(),
            "generation service ready"
        );

        let context = Arc::new(GenerationContext::new(
            FallbackOrchestrator::new(registry.clone(), limiter.clone()),
            OperationCaches::from_settings(&settings.cache),
            GenerationLogger::spawn(log_store),
            settings.routing.clone(),
        ));

        Self {
            bio: BioFacade::new(context.clone()),
            image: ImageFacade::new(context.clone()),
            image_variations: ImageVariationsFacade::new(context.clone()),
            prompt_rewrite: PromptRewriteFacade::new(context.clone()),
            prompt_analysis: PromptAnalysisFacade::new(context.clone()),
            prompt_variations: PromptVariationsFacade::new(context.clone()),
            context,
            registry,
            limiter,
        }
    }

    pub async fn generate_bio(
        &self,
        user_id: &str,
        artist: &ArtistInfo,
        options: &BioOptions,
    ) -> Result<BioOutput, GenerationError> {
        self.bio.generate(user_id, artist, options).await
    }

    pub async fn generate_image(
        &self,
        user_id: &str,
        image: &ImageRequest,
        options: &ImageOptions,
    ) -> Result<ImageOutput, GenerationError> {
        self.image.generate(user_id, image, options).await
    }

    pub async fn generate_image_variations(
        &self,
        user_id: &str,
        image: &ImageRequest,
        count: u32,
        options: &ImageOptions,
    ) -> Result<ImageVariationsOutput, GenerationError> {
        self.image_variations
            .generate(user_id, image, count, options)
            .await
    }

    pub async fn rewrite_prompt(
        &self,
        user_id: &str,
        prompt: &PromptRequest,
        options: &PromptOptions,
    ) -> Result<RewriteOutput, GenerationError> {
        self.prompt_rewrite.rewrite(user_id, prompt, options).await
    }

    pub async fn analyze_prompt(
        &self,
        user_id: &str,
        prompt: &str,
        options: &PromptOptions,
    ) -> Result<AnalysisOutput, GenerationError> {
        self.prompt_analysis.analyze(user_id, prompt, options).await
    }

    pub async fn generate_prompt_variations(
        &self,
        user_id: &str,
        base_prompt: &str,
        options: &PromptOptions,
        count: u32,
    ) -> Result<PromptVariationsOutput, GenerationError> {
        self.prompt_variations
            .generate(user_id, base_prompt, options, count)
            .await
    }

    /// Availability and liveness of every registered provider.
    pub async fn check_service_availability(&self) -> Vec<ProviderAvailability> {
        let mut statuses = Vec::with_capacity(self.registry.len());
        for adapter in self.registry.iter() {
            statuses.push(adapter.availability().await);
        }
        statuses
    }

    pub fn get_service_quotas(&self) -> Vec<QuotaInfo> {
        self.registry.iter().map(|a| a.quota_info()).collect()
    }

    pub fn get_cache_stats(&self) -> BTreeMap<OperationKind, CacheStats> {
        self.context.caches.stats()
    }

    pub fn clear_all_caches(&self) {
        self.context.caches.clear_all();
        tracing::info!("all response caches cleared");
    }

    /// Evict expired cache entries; returns how many were dropped.
    pub fn purge_expired_caches(&self) -> usize {
        self.context.caches.purge_expired()
    }

    /// Wait for queued audit entries to reach the store.
    pub async fn flush_logs(&self) {
        self.context.logger.flush().await;
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl std::fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationService")
            .field("providers", &self.registry.names())
            .field("limiter", &self.limiter)
            .finish()
    }
}
