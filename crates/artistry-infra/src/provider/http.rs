//! HTTP plumbing shared by every provider backend.
//!
//! Status codes map the same way for all backends: 401/403 are
//! authentication failures, 429 is a remote rate limit (honouring
//! `Retry-After` seconds), 400/404/422 are request errors, and every other
//! non-2xx status or transport failure is a retryable transport error.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use artistry_types::error::ProviderError;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Build a client with the configured per-call timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport {
            message: format!("failed to create HTTP client: {e}"),
        })
}

pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        format!("HTTP request failed: {err}")
    };
    ProviderError::Transport { message }
}

/// Pass a 2xx response through, otherwise read the body and classify.
pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = retry_after_ms(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, retry_after, &body))
}

pub(crate) fn status_error(status: StatusCode, retry_after_ms: Option<u64>, body: &str) -> ProviderError {
    let body = truncate(body);
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed,
        429 => ProviderError::RateLimited { retry_after_ms },
        400 | 404 | 422 => ProviderError::InvalidRequest(format!("HTTP {status}: {body}")),
        _ => ProviderError::Transport {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// `Retry-After` in delta-seconds, as milliseconds.
pub(crate) fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, None, ""),
            ProviderError::AuthenticationFailed
        );
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, None, ""),
            ProviderError::AuthenticationFailed
        );
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(2000), ""),
            ProviderError::RateLimited {
                retry_after_ms: Some(2000)
            }
        );
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, None, "bad"),
            ProviderError::InvalidRequest(_)
        ));
        assert!(status_error(StatusCode::BAD_GATEWAY, None, "").is_retryable());
        assert!(status_error(StatusCode::INTERNAL_SERVER_ERROR, None, "").is_retryable());
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after_ms(&headers), Some(7000));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after_ms(&headers), None);
    }

    #[test]
    fn test_long_bodies_truncated() {
        let body = "x".repeat(2000);
        let err = status_error(StatusCode::BAD_REQUEST, None, &body);
        let ProviderError::InvalidRequest(message) = err else {
            panic!("expected InvalidRequest");
        };
        assert!(message.len() < 600);
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("https://api.example.com/v1/"), "https://api.example.com/v1");
    }
}
