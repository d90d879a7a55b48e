//! Provider-facing request/response shapes and backend kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Text,
    Image,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Text => write!(f, "text"),
            Capability::Image => write!(f, "image"),
        }
    }
}

/// Concrete backend implementation selected in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    GeminiText,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    NanoBanana,
    Seedance,
}

impl ProviderKind {
    pub fn capability(&self) -> Capability {
        match self {
            ProviderKind::GeminiText | ProviderKind::OpenAiCompatible => Capability::Text,
            ProviderKind::NanoBanana | ProviderKind::Seedance => Capability::Image,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::GeminiText => write!(f, "gemini_text"),
            ProviderKind::OpenAiCompatible => write!(f, "openai_compatible"),
            ProviderKind::NanoBanana => write!(f, "nano_banana"),
            ProviderKind::Seedance => write!(f, "seedance"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini_text" => Ok(ProviderKind::GeminiText),
            "openai_compatible" => Ok(ProviderKind::OpenAiCompatible),
            "nano_banana" => Ok(ProviderKind::NanoBanana),
            "seedance" => Ok(ProviderKind::Seedance),
            other => Err(format!("invalid provider kind: '{other}'")),
        }
    }
}

/// A single call handed to a provider backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Image size as `"WIDTHxHEIGHT"`; ignored by text backends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ProviderRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: None,
            temperature: None,
            size: None,
        }
    }

    pub fn image(prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            size: Some(size.into()),
            ..Self::text(prompt)
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Raw backend output: generated text, or an image URL for image backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutput {
    pub content: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::GeminiText,
            ProviderKind::OpenAiCompatible,
            ProviderKind::NanoBanana,
            ProviderKind::Seedance,
        ] {
            let parsed: ProviderKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::OpenAiCompatible).unwrap();
        assert_eq!(json, "\"openai_compatible\"");
        let parsed: ProviderKind = serde_json::from_str("\"nano_banana\"").unwrap();
        assert_eq!(parsed, ProviderKind::NanoBanana);
    }

    #[test]
    fn test_capability_by_kind() {
        assert_eq!(ProviderKind::GeminiText.capability(), Capability::Text);
        assert_eq!(ProviderKind::Seedance.capability(), Capability::Image);
    }

    #[test]
    fn test_request_builders() {
        let req = ProviderRequest::image("a portrait", "1024x1024").with_system("be bold");
        assert_eq!(req.size.as_deref(), Some("1024x1024"));
        assert_eq!(req.system.as_deref(), Some("be bold"));
        assert!(req.max_tokens.is_none());
    }
}
