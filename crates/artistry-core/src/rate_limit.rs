//! Fixed-window request admission per provider.
//!
//! Each provider owns one window: a start instant and a count. The count
//! never exceeds the provider's limit inside a window, and the whole window
//! resets to zero once `now >= start + length`. There is no sliding decay.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use artistry_types::status::QuotaInfo;

/// Default admitted requests per provider per window.
const DEFAULT_LIMIT: u32 = 60;

/// Default window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Limit and window length for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Counter for the currently open window of one provider.
struct Window {
    count: u32,
    started: Instant,
}

impl Window {
    fn fresh() -> Self {
        Self {
            count: 0,
            started: Instant::now(),
        }
    }

    fn roll(&mut self, length: Duration) {
        if self.started.elapsed() >= length {
            self.count = 0;
            self.started = Instant::now();
        }
    }
}

/// Per-provider fixed-window rate limiter.
///
/// All mutation happens under the map's per-entry lock, so a check and the
/// following increment in [`RateLimiter::try_acquire`] cannot interleave with
/// another caller's.
pub struct RateLimiter {
    default: RateLimit,
    limits: DashMap<String, RateLimit>,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(default: RateLimit) -> Self {
        Self {
            default,
            limits: DashMap::new(),
            windows: DashMap::new(),
        }
    }

    /// Override the limit for one provider.
    pub fn set_limit(&self, provider: impl Into<String>, limit: RateLimit) {
        self.limits.insert(provider.into(), limit);
    }

    pub fn limit_for(&self, provider: &str) -> RateLimit {
        self.limits
            .get(provider)
            .map(|l| *l.value())
            .unwrap_or(self.default)
    }

    /// Whether a request to `provider` would currently be admitted.
    pub fn can_make_request(&self, provider: &str) -> bool {
        self.remaining(provider) > 0
    }

    /// Count one request against the provider's current window.
    ///
    /// Saturates at the limit; callers are expected to check first.
    pub fn record_request(&self, provider: &str) {
        let limit = self.limit_for(provider);
        let mut entry = self
            .windows
            .entry(provider.to_string())
            .or_insert_with(Window::fresh);
        let window = entry.value_mut();
        window.roll(limit.window);
        if window.count < limit.limit {
            window.count += 1;
        } else {
            tracing::debug!(provider, "request recorded past the window limit");
        }
    }

    /// Check and record in one step. Returns false when the window is full.
    pub fn try_acquire(&self, provider: &str) -> bool {
        let limit = self.limit_for(provider);
        let mut entry = self
            .windows
            .entry(provider.to_string())
            .or_insert_with(Window::fresh);
        let window = entry.value_mut();
        window.roll(limit.window);

        if window.count >= limit.limit {
            tracing::debug!(
                provider,
                count = window.count,
                limit = limit.limit,
                "local rate limit reached"
            );
            return false;
        }

        window.count += 1;
        true
    }

    /// Requests still admissible in the current window.
    pub fn remaining(&self, provider: &str) -> u32 {
        let limit = self.limit_for(provider);
        match self.windows.get(provider) {
            Some(window) if window.started.elapsed() < limit.window => {
                limit.limit.saturating_sub(window.count)
            }
            _ => limit.limit,
        }
    }

    pub fn quota(&self, provider: &str) -> QuotaInfo {
        let limit = self.limit_for(provider);
        let (remaining, resets_in) = match self.windows.get(provider) {
            Some(window) if window.started.elapsed() < limit.window => (
                limit.limit.saturating_sub(window.count),
                limit.window.saturating_sub(window.started.elapsed()),
            ),
            _ => (limit.limit, Duration::ZERO),
        };

        QuotaInfo {
            provider: provider.to_string(),
            limit: limit.limit,
            remaining,
            window_secs: limit.window.as_secs(),
            resets_in_ms: resets_in.as_millis() as u64,
        }
    }

    /// Drop every open window.
    pub fn reset(&self) {
        self.windows.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("default", &self.default)
            .field("overrides", &self.limits.len())
            .field("open_windows", &self.windows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimit {
            limit,
            window: Duration::from_secs(secs),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_denies_after_limit_until_window_resets() {
        let limiter = limiter(3, 60);

        for _ in 0..3 {
            assert!(limiter.can_make_request("gemini"));
            limiter.record_request("gemini");
        }
        assert!(!limiter.can_make_request("gemini"));
        assert_eq!(limiter.remaining("gemini"), 0);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!limiter.can_make_request("gemini"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.can_make_request("gemini"));
        assert_eq!(limiter.remaining("gemini"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_reset_has_no_carry_over() {
        let limiter = limiter(2, 10);
        assert!(limiter.try_acquire("seedance"));
        assert!(limiter.try_acquire("seedance"));
        assert!(!limiter.try_acquire("seedance"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.try_acquire("seedance"));
        assert_eq!(limiter.remaining("seedance"), 1);
    }

    #[test]
    fn test_count_never_exceeds_limit() {
        let limiter = limiter(1, 60);
        limiter.record_request("openai");
        limiter.record_request("openai");
        limiter.record_request("openai");
        assert_eq!(limiter.remaining("openai"), 0);
        assert_eq!(limiter.quota("openai").remaining, 0);
    }

    #[test]
    fn test_providers_are_independent() {
        let limiter = limiter(1, 60);
        assert!(limiter.try_acquire("gemini"));
        assert!(!limiter.try_acquire("gemini"));
        assert!(limiter.try_acquire("openai"));
    }

    #[test]
    fn test_per_provider_override() {
        let limiter = limiter(1, 60);
        limiter.set_limit(
            "nanobanana",
            RateLimit {
                limit: 5,
                window: Duration::from_secs(30),
            },
        );
        assert_eq!(limiter.remaining("nanobanana"), 5);
        assert_eq!(limiter.quota("nanobanana").window_secs, 30);
        assert_eq!(limiter.remaining("gemini"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_reports_reset_time() {
        let limiter = limiter(4, 60);
        let idle = limiter.quota("gemini");
        assert_eq!(idle.remaining, 4);
        assert_eq!(idle.resets_in_ms, 0);

        limiter.record_request("gemini");
        tokio::time::advance(Duration::from_secs(15)).await;
        let quota = limiter.quota("gemini");
        assert_eq!(quota.remaining, 3);
        assert_eq!(quota.resets_in_ms, 45_000);
    }

    #[test]
    fn test_reset_clears_windows() {
        let limiter = limiter(1, 60);
        assert!(limiter.try_acquire("gemini"));
        limiter.reset();
        assert!(limiter.can_make_request("gemini"));
    }

    #[tokio::test]
    async fn test_concurrent_acquire_never_over_admits() {
        let limiter = std::sync::Arc::new(limiter(10, 60));
        let mut handles = Vec::new();
        for _ in 0..50 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.try_acquire("gemini") }));
        }
        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
