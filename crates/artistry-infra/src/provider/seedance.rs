//! Seedance image backend (OpenAI-style `/images/generations`).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use artistry_core::provider::GenerationProvider;
use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use super::http;

pub const DEFAULT_BASE_URL: &str = "https://ark.ap-southeast.bytepluses.com/api/v3";

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    response_format: &'static str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

pub struct SeedanceProvider {
    name: String,
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl SeedanceProvider {
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

impl GenerationProvider for SeedanceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::Image
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let body = ImageGenerationRequest {
            model: &self.model,
            prompt: &request.prompt,
            size: request.size.as_deref(),
            response_format: "url",
            n: 1,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.key()?)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;
        let images: ImageGenerationResponse =
            http::read_json(http::check_status(response).await?).await?;

        let content = images
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(ProviderOutput {
            content,
            model: images.model.unwrap_or_else(|| self.model.clone()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> SeedanceProvider {
        SeedanceProvider::new(
            "seedance",
            Some(SecretString::from("sd-key".to_string())),
            "seedream-3.0",
            Some(&server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "seedream-3.0",
                "size": "1024x1792",
                "response_format": "url"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"url": "https://cdn.seedance/1.png"}, {"url": "https://cdn.seedance/2.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = provider(&server)
            .generate(&ProviderRequest::image("portrait", "1024x1792"))
            .await
            .unwrap();
        assert_eq!(output.content, "https://cdn.seedance/1.png");
        assert_eq!(output.model, "seedream-3.0");
    }

    #[tokio::test]
    async fn test_no_data_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&ProviderRequest::image("x", "512x512"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_bad_request_not_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("prompt rejected"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&ProviderRequest::image("x", "512x512"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(ref m) if m.contains("prompt rejected")));
        assert!(!err.is_retryable());
    }
}
