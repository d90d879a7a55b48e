//! Artist bio generation.

use std::sync::Arc;

use serde_json::json;
use tokio::time::Instant;

use artistry_types::error::GenerationError;
use artistry_types::generation::{GenerationRequest, OperationKind};
use artistry_types::output::BioOutput;
use artistry_types::provider::Capability;
use artistry_types::request::{ArtistInfo, BioOptions};

use super::{GenerationContext, Pipeline, require};
use crate::prompts;
use crate::synth;

pub struct BioFacade {
    context: Arc<GenerationContext>,
}

impl BioFacade {
    pub fn new(context: Arc<GenerationContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(
        name = "generation",
        skip_all,
        fields(
            operation = OperationKind::Bio.as_str(),
            user_id = %user_id,
            provider = tracing::field::Empty,
            cached = tracing::field::Empty
        )
    )]
    pub async fn generate(
        &self,
        user_id: &str,
        artist: &ArtistInfo,
        options: &BioOptions,
    ) -> Result<BioOutput, GenerationError> {
        validate(artist)?;
        let started = Instant::now();

        let providers = self
            .context
            .provider_order(OperationKind::Bio, options.providers.as_deref());
        let request = GenerationRequest::new(
            OperationKind::Bio,
            user_id,
            &json!({ "artist": artist, "length": options.length }),
            providers,
        );

        let result = self
            .context
            .resolve(
                &request,
                Pipeline {
                    cache: &self.context.caches.bio,
                    capability: Capability::Text,
                    provider_request: prompts::bio_request(artist, options.length),
                    parse: prompts::parse_text,
                    fallback: || synth::fallback_bio(artist, options.length),
                },
            )
            .await;

        self.context.log_result(&request, &result, started);
        Ok(result.into())
    }
}

fn validate(artist: &ArtistInfo) -> Result<(), GenerationError> {
    require("name", &artist.name)?;
    require("genre", &artist.genre)?;
    if artist.personality_traits.iter().all(|t| t.trim().is_empty()) {
        return Err(GenerationError::missing("personality_traits"));
    }
    require("visual_style", &artist.visual_style)?;
    require("speaking_style", &artist.speaking_style)?;
    Ok(())
}
