//! Nano Banana image backend (Gemini image model via `generateContent`).
//!
//! The first inline image part is returned as a `data:` URL; a `fileData`
//! part is returned by its URI.

use std::time::Duration;

use secrecy::SecretString;

use artistry_core::provider::GenerationProvider;
use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use super::gemini::{
    Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

pub struct NanoBananaProvider {
    name: String,
    client: GeminiClient,
}

impl NanoBananaProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: Option<SecretString>,
        model: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            name: name.into(),
            client: GeminiClient::new(api_key, model, base_url, timeout)?,
        })
    }

    fn to_gemini_request(request: &ProviderRequest) -> GenerateContentRequest {
        let prompt = match &request.size {
            Some(size) => format!("{}\n\nOutput size: {size}.", request.prompt),
            None => request.prompt.clone(),
        };
        GenerateContentRequest {
            contents: vec![Content::user(&prompt)],
            system_instruction: request.system.as_deref().map(Content::system),
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                ..Default::default()
            }),
        }
    }
}

/// The first image in the response, as a URL.
fn image_url(response: &GenerateContentResponse) -> Option<String> {
    response.parts().find_map(|part| {
        if let Some(inline) = &part.inline_data {
            return Some(format!("data:{};base64,{}", inline.mime_type, inline.data));
        }
        part.file_data.as_ref().map(|f| f.file_uri.clone())
    })
}

impl GenerationProvider for NanoBananaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::Image
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let response = self
            .client
            .generate_content(&Self::to_gemini_request(request))
            .await?;

        let content = image_url(&response).ok_or(ProviderError::EmptyResponse)?;
        Ok(ProviderOutput {
            content,
            model: response
                .model_version
                .unwrap_or_else(|| self.client.model().to_string()),
        })
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        self.client.get_model().await
    }
}
