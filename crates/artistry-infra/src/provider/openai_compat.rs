//! OpenAI-compatible chat completions backend (`/chat/completions`).
//!
//! Works against any endpoint speaking the OpenAI chat API; the base URL
//! defaults to OpenAI's.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use artistry_core::provider::GenerationProvider;
use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use super::http;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompatibleProvider {
    name: String,
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: Option<SecretString>,
        model: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            name: name.into(),
            client: http::build_client(timeout)?,
            api_key,
            base_url: http::trim_base_url(base_url.unwrap_or(DEFAULT_BASE_URL)),
            model: model.to_string(),
        })
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or(ProviderError::AuthenticationFailed)
    }
}

impl GenerationProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.key()?)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;
        let chat: ChatResponse = http::read_json(http::check_status(response).await?).await?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(ProviderOutput {
            content,
            model: chat.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(self.key()?)
            .send()
            .await
            .map_err(http::transport_error)?;
        http::check_status(response).await.map(|_| ())
    }
}
