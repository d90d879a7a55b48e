//! Artist image generation, single and in variation batches.

use std::sync::Arc;

use serde_json::json;
use tokio::time::Instant;
use uuid::Uuid;

use artistry_types::error::GenerationError;
use artistry_types::generation::{GenerationRequest, GenerationResult, OperationKind};
use artistry_types::output::{ImageOutput, ImageVariation, ImageVariationsOutput};
use artistry_types::provider::Capability;
use artistry_types::request::{ImageOptions, ImageRequest};

use super::{GenerationContext, LogRecord, Pipeline, batch_provider, require, require_count};
use crate::prompts;
use crate::synth;

pub struct ImageFacade {
    context: Arc<GenerationContext>,
}

impl ImageFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::Image.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn generate(
        &self,
        user_id: &str,
        image: &ImageRequest,
        options: &ImageOptions,
    ) -> Result<ImageOutput, GenerationError> {
        validate(image)?;
        let started = Instant::now();

        let request = build_request(&self.context, OperationKind::Image, user_id, image, options);
        let result = render(&self.context, &request, image, options, None).await;

        self.context.log_result(&request, &result, started);
        Ok(result.into())
    }
}

/// Runs `count` image generations one after another as a single call.
pub struct ImageVariationsFacade {
    context: Arc<GenerationContext>,
}

impl ImageVariationsFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::ImageVariations.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn generate(
        &self,
        user_id: &str,
        image: &ImageRequest,
        count: u32,
        options: &ImageOptions,
    ) -> Result<ImageVariationsOutput, GenerationError> {
        validate(image)?;
        require_count(count)?;
        let started = Instant::now();

        let request = build_request(
            &self.context,
            OperationKind::ImageVariations,
            user_id,
            image,
            options,
        );

        let mut variations = Vec::with_capacity(count as usize);
        let mut errors = Vec::new();
        let mut degraded = false;
        let mut all_cached = true;

        for index in 0..count {
            let result = render(
                &self.context,
                &request.for_variation(index),
                image,
                options,
                Some(index),
            )
            .await;

            degraded |= result.is_fallback();
            all_cached &= result.cached;
            errors.extend(result.errors);
            variations.push(ImageVariation {
                image_url: result.output,
                provider: result.provider,
                generation_id: result.generation_id,
            });
        }

        let output = ImageVariationsOutput {
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

fn validate(image: &ImageRequest) -> Result<(), GenerationError> {
    require("name", &image.name)?;
    require("visual_style", &image.visual_style)?;
    Ok(())
}

fn build_request(
    context: &GenerationContext,
    kind: OperationKind,
    user_id: &str,
    image: &ImageRequest,
    options: &ImageOptions,
) -> GenerationRequest {
    let providers = context.provider_order(kind, image.providers.as_deref());
    let subject = ImageRequest {
        providers: None,
        ..image.clone()
    };
    GenerationRequest::new(
        kind,
        user_id,
        &json!({ "image": subject, "aspect_ratio": options.aspect_ratio }),
        providers,
    )
}

/// One image through cache and providers; `variant` seeds prompt and fallback.
async fn render(
    context: &GenerationContext,
    request: &GenerationRequest,
    image: &ImageRequest,
    options: &ImageOptions,
    variant: Option<u32>,
) -> GenerationResult<String> {
    context
        .resolve(
            request,
            Pipeline {
                cache: &context.caches.image,
                capability: Capability::Image,
                provider_request: prompts::image_request(image, options.aspect_ratio, variant),
                parse: prompts::parse_image_url,
                fallback: || {
                    synth::fallback_image_url(
                        &image.name,
                        &image.visual_style,
                        variant.unwrap_or(0),
                        options.aspect_ratio.dimensions(),
                    )
                },
            },
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::testing::Harness;
    use crate::test_support::{ScriptedProvider, transport};
    use artistry_types::error::ProviderError;
    use artistry_types::generation::{AttemptErrorKind, FALLBACK_PROVIDER};
    use std::collections::HashSet;

    fn request(providers: &[&str]) -> ImageRequest {
        ImageRequest {
            name: "Nova".to_string(),
            visual_style: "neon cyberpunk".to_string(),
            providers: Some(providers.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_falls_through_to_second_provider() {
        let (nanobanana, nb) = ScriptedProvider::failing(
            "nanobanana",
            Capability::Image,
            ProviderError::InvalidRequest("blocked".to_string()),
        )
        .boxed();
        let (seedance, sd) =
            ScriptedProvider::ok("seedance", Capability::Image, "https://cdn.seedance/img.png").boxed();
        let harness = Harness::new(vec![nanobanana, seedance]);
        let facade = ImageFacade::new(harness.context.clone());

        let output = facade
            .generate("u1", &request(&["nanobanana", "seedance"]), &ImageOptions::default())
            .await
            .unwrap();

        assert_eq!(output.provider, "seedance");
        assert_eq!(output.image_url, "https://cdn.seedance/img.png");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].provider, "nanobanana");
        assert_eq!(nb.calls(), 1);
        assert_eq!(sd.calls(), 1);
        assert_eq!(harness.logs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_calls_hit_cache_without_rate_limit() {
        let (seedance, sd) =
            ScriptedProvider::ok("seedance", Capability::Image, "https://cdn.seedance/a.png").boxed();
        let harness = Harness::new(vec![seedance]);
        let facade = ImageFacade::new(harness.context.clone());
        let req = request(&["seedance"]);

        let first = facade.generate("u1", &req, &ImageOptions::default()).await.unwrap();
        let remaining = harness.limiter.remaining("seedance");
        let second = facade.generate("u1", &req, &ImageOptions::default()).await.unwrap();

        assert_eq!(first.image_url, second.image_url);
        assert_eq!(harness.limiter.remaining("seedance"), remaining);
        assert_eq!(sd.calls(), 1);

        let logs = harness.logs().await;
        assert_eq!(logs.len(), 2);
        assert!(logs[1].cached);
    }

    #[tokio::test]
    async fn test_text_provider_rejected_for_images() {
        let (gemini, probe) = ScriptedProvider::ok("gemini", Capability::Text, "a poem").boxed();
        let harness = Harness::new(vec![gemini]);
        let facade = ImageFacade::new(harness.context.clone());

        let output = facade
            .generate("u1", &request(&["gemini"]), &ImageOptions::default())
            .await
            .unwrap();
        assert_eq!(output.provider, FALLBACK_PROVIDER);
        assert_eq!(output.errors[0].kind, AttemptErrorKind::Unsupported);
        assert_eq!(probe.calls(), 0);
        assert!(output.image_url.starts_with("https://picsum.photos/seed/"));
    }

    #[tokio::test]
    async fn test_variations_all_failing_get_distinct_fallbacks() {
        let (nanobanana, _) =
            ScriptedProvider::failing("nanobanana", Capability::Image, transport("down")).boxed();
        let (seedance, _) =
            ScriptedProvider::failing("seedance", Capability::Image, transport("down")).boxed();
        let harness = Harness::new(vec![nanobanana, seedance]);
        let facade = ImageVariationsFacade::new(harness.context.clone());

        let output = facade
            .generate("u1", &request(&["nanobanana", "seedance"]), 3, &ImageOptions::default())
            .await
            .unwrap();

        assert_eq!(output.variations.len(), 3);
        assert!(output.variations.iter().all(|v| v.provider == FALLBACK_PROVIDER));
        let urls: HashSet<&str> = output.variations.iter().map(|v| v.image_url.as_str()).collect();
        assert_eq!(urls.len(), 3);
        assert!(!output.success);
        assert_eq!(output.errors.len(), 6);

        let logs = harness.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, OperationKind::ImageVariations);
        assert_eq!(logs[0].id, output.generation_id);
        assert_eq!(logs[0].provider, FALLBACK_PROVIDER);
        assert!(!logs[0].success);
    }

    #[tokio::test]
    async fn test_variation_degrades_individually() {
        let (seedance, sd) = ScriptedProvider::ok("seedance", Capability::Image, "https://cdn/x.png")
            .then(Ok("https://cdn/0.png"))
            .then(Err(transport("flaky")))
            .then(Ok("https://cdn/2.png"))
            .boxed();
        let harness = Harness::new(vec![seedance]);
        let facade = ImageVariationsFacade::new(harness.context.clone());

        let output = facade
            .generate("u1", &request(&["seedance"]), 3, &ImageOptions::default())
            .await
            .unwrap();

        let providers: Vec<&str> = output.variations.iter().map(|v| v.provider.as_str()).collect();
        assert_eq!(providers, vec!["seedance", FALLBACK_PROVIDER, "seedance"]);
        assert!(!output.success);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(sd.calls(), 3);

        let prompts = sd.prompts();
        assert!(prompts[0].contains("Variation 1"));
        assert!(prompts[2].contains("Variation 3"));

        let logs = harness.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].provider, "mixed");
    }

    #[tokio::test]
    async fn test_variation_count_validated() {
        let harness = Harness::new(Vec::new());
        let facade = ImageVariationsFacade::new(harness.context.clone());
        let err = facade
            .generate("u1", &request(&["seedance"]), 0, &ImageOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Validation { ref field, .. } if field == "count"));
        assert!(harness.logs().await.is_empty());
    }
}
