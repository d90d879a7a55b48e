//! Generation audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::OperationKind;

/// The single audit record produced per top-level facade invocation.
///
/// `id` equals the `generation_id` returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLogEntry {
    pub id: Uuid,
    pub user_id: String,
    pub operation: OperationKind,
    pub provider: String,
    pub parameters: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub success: bool,
    pub cached: bool,
    pub created_at: DateTime<Utc>,
}

/// Filter for reading the history back. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationLogQuery {
    pub user_id: Option<String>,
    pub operation: Option<OperationKind>,
    pub provider: Option<String>,
    pub success: Option<bool>,
    pub limit: Option<u32>,
}

impl GenerationLogQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &GenerationLogEntry) -> bool {
        self.user_id.as_ref().is_none_or(|u| *u == entry.user_id)
            && self.operation.is_none_or(|o| o == entry.operation)
            && self.provider.as_ref().is_none_or(|p| *p == entry.provider)
            && self.success.is_none_or(|s| s == entry.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, operation: OperationKind, provider: &str, success: bool) -> GenerationLogEntry {
        GenerationLogEntry {
            id: Uuid::now_v7(),
            user_id: user.to_string(),
            operation,
            provider: provider.to_string(),
            parameters: serde_json::json!({}),
            result: None,
            error: None,
            duration_ms: 12,
            success,
            cached: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let q = GenerationLogQuery::default();
        assert!(q.matches(&entry("a", OperationKind::Bio, "gemini", true)));
        assert!(q.matches(&entry("b", OperationKind::Image, "fallback", false)));
    }

    #[test]
    fn test_query_filters_combine() {
        let q = GenerationLogQuery {
            operation: Some(OperationKind::Image),
            success: Some(false),
            ..GenerationLogQuery::for_user("u1")
        };
        assert!(q.matches(&entry("u1", OperationKind::Image, "fallback", false)));
        assert!(!q.matches(&entry("u2", OperationKind::Image, "fallback", false)));
        assert!(!q.matches(&entry("u1", OperationKind::Bio, "fallback", false)));
        assert!(!q.matches(&entry("u1", OperationKind::Image, "seedance", true)));
    }
}
