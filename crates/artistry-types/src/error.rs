use thiserror::Error;

/// Errors from a single provider attempt.
///
/// Produced by provider backends, the adapter retry loop and the fallback
/// orchestrator. None of these ever reach the caller of an operation facade;
/// they are collected as [`crate::generation::ProviderAttemptError`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("rate limited by provider (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("local rate limit reached for '{provider}'")]
    LocalRateLimit { provider: String },

    #[error("provider '{0}' is not configured")]
    NotConfigured(String),

    #[error("provider '{provider}' does not support {capability} generation")]
    Unsupported { provider: String, capability: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Transport failures are the only errors retried with exponential backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transport { .. })
    }

    /// The upstream explicitly asked us to slow down.
    pub fn is_remote_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Errors that cross the operation facade boundary.
///
/// Only validation failures surface to callers; every other condition
/// resolves into a (possibly degraded) generation result.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl GenerationError {
    /// Shorthand for a missing or blank required field.
    pub fn missing(field: &str) -> Self {
        GenerationError::Validation {
            field: field.to_string(),
            message: "required field is missing or blank".to_string(),
        }
    }
}

/// Errors from generation-history persistence.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(
            ProviderError::Transport {
                message: "connection reset".to_string()
            }
            .is_retryable()
        );
        assert!(!ProviderError::RateLimited { retry_after_ms: None }.is_retryable());
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(ProviderError::RateLimited { retry_after_ms: Some(10) }.is_remote_rate_limit());
        assert!(
            !ProviderError::LocalRateLimit {
                provider: "gemini".to_string()
            }
            .is_remote_rate_limit()
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = GenerationError::missing("name");
        assert_eq!(
            err.to_string(),
            "validation failed for 'name': required field is missing or blank"
        );
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
