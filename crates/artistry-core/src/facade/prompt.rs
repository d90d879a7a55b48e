//! Prompt rewrite, analysis and variations.

use std::sync::Arc;

use serde_json::json;
use tokio::time::Instant;
use uuid::Uuid;

use artistry_types::error::GenerationError;
use artistry_types::generation::{GenerationRequest, OperationKind};
use artistry_types::output::{AnalysisOutput, PromptVariation, PromptVariationsOutput, RewriteOutput};
use artistry_types::provider::Capability;
use artistry_types::request::{PromptOptions, PromptRequest};

use super::{GenerationContext, LogRecord, Pipeline, batch_provider, require, require_count};
use crate::prompts;
use crate::synth;

/// Options that shape the output. The provider list stays out of the key.
fn options_snapshot(options: &PromptOptions) -> serde_json::Value {
    json!({
        "complexity": options.complexity,
        "target_audience": options.target_audience,
    })
}

pub struct PromptRewriteFacade {
    context: Arc<GenerationContext>,
}

impl PromptRewriteFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::PromptRewrite.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn rewrite(
        &self,
        user_id: &str,
        prompt: &PromptRequest,
        options: &PromptOptions,
    ) -> Result<RewriteOutput, GenerationError> {
        require("original_prompt", &prompt.original_prompt)?;
        let started = Instant::now();

        let providers = self
            .context
            .provider_order(OperationKind::PromptRewrite, options.providers.as_deref());
        let request = GenerationRequest::new(
            OperationKind::PromptRewrite,
            user_id,
            &json!({ "prompt": prompt, "options": options_snapshot(options) }),
            providers,
        );

        let result = self
            .context
            .resolve(
                &request,
                Pipeline {
                    cache: &self.context.caches.prompt_rewrite,
                    capability: Capability::Text,
                    provider_request: prompts::rewrite_request(prompt, options),
                    parse: prompts::parse_rewrite,
                    fallback: || synth::fallback_rewrite(prompt, options),
                },
            )
            .await;

        self.context.log_result(&request, &result, started);
        Ok(result.into())
    }
}

pub struct PromptAnalysisFacade {
    context: Arc<GenerationContext>,
}

impl PromptAnalysisFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::PromptAnalysis.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn analyze(
        &self,
        user_id: &str,
        prompt: &str,
        options: &PromptOptions,
    ) -> Result<AnalysisOutput, GenerationError> {
        require("prompt", prompt)?;
        let started = Instant::now();

        let providers = self
            .context
            .provider_order(OperationKind::PromptAnalysis, options.providers.as_deref());
        let request = GenerationRequest::new(
            OperationKind::PromptAnalysis,
            user_id,
            &json!({ "prompt": prompt, "options": options_snapshot(options) }),
            providers,
        );

        let result = self
            .context
            .resolve(
                &request,
                Pipeline {
                    cache: &self.context.caches.prompt_analysis,
                    capability: Capability::Text,
                    provider_request: prompts::analysis_request(prompt, options),
                    parse: prompts::parse_analysis,
                    fallback: || synth::fallback_analysis(prompt),
                },
            )
            .await;

        self.context.log_result(&request, &result, started);
        Ok(result.into())
    }
}

/// Runs `count` prompt variations one after another as a single call.
pub struct PromptVariationsFacade {
    context: Arc<GenerationContext>,
}

impl PromptVariationsFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::PromptVariations.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn generate(
        &self,
        user_id: &str,
        base_prompt: &str,
        options: &PromptOptions,
        count: u32,
    ) -> Result<PromptVariationsOutput, GenerationError> {
        require("base_prompt", base_prompt)?;
        require_count(count)?;
        let started = Instant::now();

        let providers = self
            .context
            .provider_order(OperationKind::PromptVariations, options.providers.as_deref());
        let request = GenerationRequest::new(
            OperationKind::PromptVariations,
            user_id,
            &json!({ "base_prompt": base_prompt, "options": options_snapshot(options) }),
            providers,
        );

        let mut variations = Vec::with_capacity(count as usize);
        let mut errors = Vec::new();
        let mut degraded = false;
        let mut all_cached = true;

        for index in 0..count {
            let result = self
                .context
                .resolve(
                    &request.for_variation(index),
                    Pipeline {
                        cache: &self.context.caches.prompt_variations,
                        capability: Capability::Text,
                        provider_request: prompts::variation_request(base_prompt, options, index),
                        parse: prompts::parse_text,
                        fallback: || synth::fallback_prompt_variation(base_prompt, index),
                    },
                )
                .await;

            degraded |= result.is_fallback();
            all_cached &= result.cached;
            errors.extend(result.errors);
            variations.push(PromptVariation {
                prompt: result.output,
                provider: result.provider,
            });
        }

        let output = PromptVariationsOutput {
            generation_id: Uuid::now_v7(),
            variations,
            errors,
            success: !degraded,
        };

        self.context.log(LogRecord {
            request: &request,
            id: output.generation_id,
            provider: &batch_provider(output.variations.iter().map(|v| v.provider.as_str())),
            result: serde_json::to_value(&output.variations).ok(),
            errors: &output.errors,
            success: output.success,
            cached: all_cached,
            started,
        });

        Ok(output)
    }
}
