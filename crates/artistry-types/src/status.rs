//! Observability shapes: availability, quotas and cache statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::Capability;

/// Per-provider availability as reported by `check_service_availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAvailability {
    pub name: String,
    pub capability: Capability,
    /// Credential present and backend enabled.
    pub available: bool,
    /// Result of the most recent liveness probe (cached within its TTL).
    pub healthy: bool,
    pub last_check: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Snapshot of a provider's local rate-limit window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaInfo {
    pub provider: String,
    pub limit: u32,
    pub remaining: u32,
    pub window_secs: u64,
    /// Time until the current window resets; 0 when no window is open.
    pub resets_in_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub active: usize,
    /// Logically expired but not yet evicted.
    pub expired: usize,
    pub total: usize,
}

impl std::ops::Add for CacheStats {
    type Output = CacheStats;

    fn add(self, rhs: CacheStats) -> CacheStats {
        CacheStats {
            active: self.active + rhs.active,
            expired: self.expired + rhs.expired,
            total: self.total + rhs.total,
        }
    }
}
