//! Keyed response cache with TTL expiry.
//!
//! One `ResponseCache<T>` exists per operation. Entries are visible only
//! while `now < created_at + ttl`; expired entries are evicted lazily on read,
//! in bulk through [`ResponseCache::purge_expired`], and by a sweep that runs
//! on insert at most once per default TTL.

use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use artistry_types::generation::OperationKind;
use artistry_types::status::CacheStats;

/// A cached payload and the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<T> {
    pub value: T,
    pub provider: String,
}

struct CacheEntry<T> {
    value: CachedValue<T>,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.created_at + self.ttl
    }
}

pub struct ResponseCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    default_ttl: Duration,
    last_sweep: Mutex<Instant>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the live entry for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<CachedValue<T>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        // The read guard is dropped before taking the write lock.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    pub fn set(&self, key: impl Into<String>, value: CachedValue<T>, ttl: Duration) {
        self.sweep_if_due();
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Insert with the cache's default TTL.
    pub fn insert(&self, key: impl Into<String>, value: CachedValue<T>) {
        self.set(key, value, self.default_ttl);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Evict every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Entries never read again after expiring would otherwise stay forever.
    fn sweep_if_due(&self) {
        let now = Instant::now();
        let due = match self.last_sweep.lock() {
            Ok(mut last) if now.duration_since(*last) >= self.default_ttl => {
                *last = now;
                true
            }
            _ => false,
        };
        if due {
            let purged = self.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "expired cache entries swept");
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let total = self.entries.len();
        let active = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .count();
        CacheStats {
            active,
            expired: total.saturating_sub(active),
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable cache key for an operation and its parameters.
///
/// Lowercase hex SHA-256 over the operation tag and the canonical JSON form
/// of `params`, so field order never changes the key.
pub fn cache_key(kind: OperationKind, params: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical_json(params).as_bytes());
    hex(&hasher.finalize())
}

/// Serialize `value` with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cached(value: &str) -> CachedValue<String> {
        CachedValue {
            value: value.to_string(),
            provider: "gemini".to_string(),
        }
    }

    #[test]
    fn test_key_ignores_field_order() {
        let a = json!({"name": "Nova", "genre": "electronic", "opts": {"x": 1, "y": [1, 2]}});
        let b = json!({"opts": {"y": [1, 2], "x": 1}, "genre": "electronic", "name": "Nova"});
        assert_eq!(cache_key(OperationKind::Bio, &a), cache_key(OperationKind::Bio, &b));
    }

    #[test]
    fn test_key_depends_on_operation_and_values() {
        let params = json!({"name": "Nova"});
        let bio = cache_key(OperationKind::Bio, &params);
        assert_ne!(bio, cache_key(OperationKind::Image, &params));
        assert_ne!(bio, cache_key(OperationKind::Bio, &json!({"name": "Nova "})));
        assert_eq!(bio.len(), 64);
        assert!(bio.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = json!({"traits": ["bold", "shy"]});
        let b = json!({"traits": ["shy", "bold"]});
        assert_ne!(cache_key(OperationKind::Bio, &a), cache_key(OperationKind::Bio, &b));
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": {"d": 1, "c": "x"}, "a": null});
        assert_eq!(canonical_json(&value), r#"{"a":null,"b":{"c":"x","d":1}}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("k", cached("bio text"));
        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("k"), Some(cached("bio text")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_never_returned() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("k", cached("bio text"));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_unread_expired_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("stale", cached("a"));
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert("fresh", cached("b"));
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        cache.insert("newest", cached("c"));

        // "stale" expired and was never read; the sweep dropped it.
        assert_eq!(cache.len(), 2);
        assert!(cache.get("fresh").is_some());
        assert_eq!(cache.stats().expired, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_distinguish_expired_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set("short", cached("a"), Duration::from_secs(5));
        cache.insert("long", cached("b"));
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(
            cache.stats(),
            CacheStats {
                active: 1,
                expired: 1,
                total: 2
            }
        );
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.stats().total, 1);
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("a", cached("a"));
        cache.insert("b", cached("b"));
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
