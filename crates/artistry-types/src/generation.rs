//! Generation requests, results and per-attempt error records.
//!
//! A [`GenerationRequest`] is built once per facade call and never mutated.
//! A [`GenerationResult`] carries the payload together with the name of the
//! backend that produced it (or [`FALLBACK_PROVIDER`]) and every attempt
//! error encountered on the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ProviderError;

/// Provider name reported when no upstream produced the result.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// The logical capability a facade call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Bio,
    Image,
    ImageVariations,
    PromptRewrite,
    PromptAnalysis,
    PromptVariations,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Bio,
        OperationKind::Image,
        OperationKind::ImageVariations,
        OperationKind::PromptRewrite,
        OperationKind::PromptAnalysis,
        OperationKind::PromptVariations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Bio => "bio",
            OperationKind::Image => "image",
            OperationKind::ImageVariations => "image_variations",
            OperationKind::PromptRewrite => "prompt_rewrite",
            OperationKind::PromptAnalysis => "prompt_analysis",
            OperationKind::PromptVariations => "prompt_variations",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "bio" => Ok(OperationKind::Bio),
            "image" => Ok(OperationKind::Image),
            "image_variations" => Ok(OperationKind::ImageVariations),
            "prompt_rewrite" => Ok(OperationKind::PromptRewrite),
            "prompt_analysis" => Ok(OperationKind::PromptAnalysis),
            "prompt_variations" => Ok(OperationKind::PromptVariations),
            other => Err(format!("invalid operation kind: '{other}'")),
        }
    }
}

/// Immutable description of one logical generation call.
///
/// `parameters` is the JSON snapshot of the typed request and its options;
/// it feeds both the cache key and the audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub operation: OperationKind,
    pub user_id: String,
    pub parameters: serde_json::Value,
    /// Ordered provider preference for this call.
    pub providers: Vec<String>,
    /// Index of the variation within a batch, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<u32>,
}

impl GenerationRequest {
    pub fn new<P: Serialize>(
        operation: OperationKind,
        user_id: impl Into<String>,
        parameters: &P,
        providers: Vec<String>,
    ) -> Self {
        Self {
            operation,
            user_id: user_id.into(),
            parameters: serde_json::to_value(parameters).unwrap_or(serde_json::Value::Null),
            providers,
            variation: None,
        }
    }

    /// The same request, tagged as the `index`-th member of a batch.
    pub fn for_variation(&self, index: u32) -> Self {
        Self {
            variation: Some(index),
            ..self.clone()
        }
    }
}

/// Serializable classification of a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptErrorKind {
    Transport,
    RemoteRateLimit,
    LocalRateLimit,
    NotConfigured,
    Unsupported,
    Authentication,
    InvalidRequest,
    Deserialization,
    EmptyResponse,
}

impl From<&ProviderError> for AttemptErrorKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Transport { .. } => AttemptErrorKind::Transport,
            ProviderError::RateLimited { .. } => AttemptErrorKind::RemoteRateLimit,
            ProviderError::LocalRateLimit { .. } => AttemptErrorKind::LocalRateLimit,
            ProviderError::NotConfigured(_) => AttemptErrorKind::NotConfigured,
            ProviderError::Unsupported { .. } => AttemptErrorKind::Unsupported,
            ProviderError::AuthenticationFailed => AttemptErrorKind::Authentication,
            ProviderError::InvalidRequest(_) => AttemptErrorKind::InvalidRequest,
            ProviderError::Deserialization(_) => AttemptErrorKind::Deserialization,
            ProviderError::EmptyResponse => AttemptErrorKind::EmptyResponse,
        }
    }
}

/// One failed provider attempt, recorded before the next provider is tried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAttemptError {
    pub provider: String,
    pub kind: AttemptErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ProviderAttemptError {
    pub fn new(provider: impl Into<String>, error: &ProviderError) -> Self {
        Self {
            provider: provider.into(),
            kind: AttemptErrorKind::from(error),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for ProviderAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

/// Outcome of one facade call (or one variation inside a batch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult<T> {
    pub output: T,
    /// Backend that produced `output`, or [`FALLBACK_PROVIDER`].
    pub provider: String,
    pub generation_id: Uuid,
    /// Errors collected before the successful attempt (or all of them).
    pub errors: Vec<ProviderAttemptError>,
    pub cached: bool,
}

impl<T> GenerationResult<T> {
    /// Whether the payload was synthesized locally.
    pub fn is_fallback(&self) -> bool {
        self.provider == FALLBACK_PROVIDER
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerationResult<U> {
        GenerationResult {
            output: f(self.output),
            provider: self.provider,
            generation_id: self.generation_id,
            errors: self.errors,
            cached: self.cached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_roundtrip() {
        for kind in OperationKind::ALL {
            let parsed: OperationKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert_eq!(
            "image-variations".parse::<OperationKind>().unwrap(),
            OperationKind::ImageVariations
        );
        assert!("poem".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_operation_kind_serde() {
        let json = serde_json::to_string(&OperationKind::PromptRewrite).unwrap();
        assert_eq!(json, "\"prompt_rewrite\"");
    }

    #[test]
    fn test_attempt_error_from_provider_error() {
        let err = ProviderError::RateLimited {
            retry_after_ms: Some(1500),
        };
        let attempt = ProviderAttemptError::new("seedance", &err);
        assert_eq!(attempt.provider, "seedance");
        assert_eq!(attempt.kind, AttemptErrorKind::RemoteRateLimit);
        assert!(attempt.message.contains("1500"));
        assert_eq!(attempt.to_string(), format!("seedance: {}", err));
    }

    #[test]
    fn test_result_fallback_flag_and_map() {
        let result = GenerationResult {
            output: 3,
            provider: FALLBACK_PROVIDER.to_string(),
            generation_id: Uuid::now_v7(),
            errors: Vec::new(),
            cached: false,
        };
        assert!(result.is_fallback());
        let mapped = result.map(|n| n.to_string());
        assert_eq!(mapped.output, "3");
        assert!(mapped.is_fallback());
    }

    #[test]
    fn test_request_variation_tag() {
        let request = GenerationRequest::new(
            OperationKind::Image,
            "user-1",
            &serde_json::json!({"name": "Nova"}),
            vec!["seedance".to_string()],
        );
        assert!(request.variation.is_none());
        let v = request.for_variation(2);
        assert_eq!(v.variation, Some(2));
        assert_eq!(v.parameters, request.parameters);
    }
}
