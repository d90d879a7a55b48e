//! Google Generative Language API (`models/{model}:generateContent`).
//!
//! [`GeminiClient`] owns the HTTP details and wire types; it is shared by
//! the text backend here and the Nano Banana image backend. The API key is
//! held in a [`SecretString`] and only exposed when building the request
//! header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use artistry_core::provider::GenerationProvider;
use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use super::http;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub file_uri: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub(crate) struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<SecretString>,
        model: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            api_key,
            base_url: http::trim_base_url(base_url.unwrap_or(DEFAULT_BASE_URL)),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or(ProviderError::AuthenticationFailed)
    }

    pub async fn generate_content(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.key()?)
            .json(body)
            .send()
            .await
            .map_err(http::transport_error)?;
        http::read_json(http::check_status(response).await?).await
    }

    /// `GET models/{model}`: verifies key and model without generating.
    pub async fn get_model(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.key()?)
            .send()
            .await
            .map_err(http::transport_error)?;
        http::check_status(response).await.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Text backend
// ---------------------------------------------------------------------------

/// Gemini text generation backend.
pub struct GeminiTextProvider {
    name: String,
    client: GeminiClient,
}

impl GeminiTextProvider {
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
        let generation_config = (request.max_tokens.is_some() || request.temperature.is_some())
            .then(|| GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                response_modalities: None,
            });
        GenerateContentRequest {
            contents: vec![Content::user(&request.prompt)],
            system_instruction: request.system.as_deref().map(Content::system),
            generation_config,
        }
    }
}

impl GenerationProvider for GeminiTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let response = self
            .client
            .generate_content(&Self::to_gemini_request(request))
            .await?;

        let content: String = response
            .parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

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
