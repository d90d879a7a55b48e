//! Orchestrator configuration types.
//!
//! `OrchestratorSettings` represents the top-level `config.toml`. Every field
//! has a serde default so a partial (or empty) file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::generation::OperationKind;
use crate::provider::ProviderKind;

/// Top-level configuration for the orchestration layer.
///
/// Loaded from `~/.artistry/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Per-call timeout applied by every provider backend.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Age under which a cached liveness result is reused.
    #[serde(default = "default_health_check_ttl_secs")]
    pub health_check_ttl_secs: u64,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub routing: RoutingSettings,

    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSettings>,
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_health_check_ttl_secs() -> u64 {
    300
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            health_check_ttl_secs: default_health_check_ttl_secs(),
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            routing: RoutingSettings::default(),
            providers: default_providers(),
        }
    }
}

impl OrchestratorSettings {
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// Backoff parameters shared by every adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Wait after a remote rate-limit signal without a reported reset time.
    pub rate_limit_cooldown_ms: u64,
    /// Upper bound on any remote rate-limit wait, reported or not.
    pub max_cooldown_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            rate_limit_cooldown_ms: 60_000,
            max_cooldown_ms: 300_000,
        }
    }
}

/// Per-operation cache TTLs in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub bio: u64,
    /// Also used by image variations.
    pub image: u64,
    pub prompt_rewrite: u64,
    pub prompt_analysis: u64,
    pub prompt_variations: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            bio: 3_600,
            image: 86_400,
            prompt_rewrite: 3_600,
            prompt_analysis: 3_600,
            prompt_variations: 1_800,
        }
    }
}

impl CacheSettings {
    pub fn ttl_secs(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Bio => self.bio,
            OperationKind::Image | OperationKind::ImageVariations => self.image,
            OperationKind::PromptRewrite => self.prompt_rewrite,
            OperationKind::PromptAnalysis => self.prompt_analysis,
            OperationKind::PromptVariations => self.prompt_variations,
        }
    }
}

/// Default provider preference order per operation family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub bio: Vec<String>,
    pub image: Vec<String>,
    /// Used by rewrite, analysis and prompt variations.
    pub prompt: Vec<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            bio: vec!["gemini".to_string(), "openai".to_string()],
            image: vec!["nanobanana".to_string(), "seedance".to_string()],
            prompt: vec!["gemini".to_string(), "openai".to_string()],
        }
    }
}

impl RoutingSettings {
    pub fn order_for(&self, kind: OperationKind) -> &[String] {
        match kind {
            OperationKind::Bio => &self.bio,
            OperationKind::Image | OperationKind::ImageVariations => &self.image,
            OperationKind::PromptRewrite
            | OperationKind::PromptAnalysis
            | OperationKind::PromptVariations => &self.prompt,
        }
    }
}

/// One configured backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Name used in routing lists and reported in results.
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    /// Override of the backend's default API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable holding the credential. Never the key itself.
    pub api_key_env: String,
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_requests_per_window() -> u32 {
    60
}

fn default_window_secs() -> u64 {
    60
}

fn default_enabled() -> bool {
    true
}

impl ProviderSettings {
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            model: model.into(),
            base_url: None,
            api_key_env: api_key_env.into(),
            requests_per_window: default_requests_per_window(),
            window_secs: default_window_secs(),
            enabled: default_enabled(),
        }
    }

    /// Rate-limit window length. A zero window would reset on every check,
    /// so it falls back to the default.
    pub fn window(&self) -> Duration {
        match self.window_secs {
            0 => Duration::from_secs(default_window_secs()),
            secs => Duration::from_secs(secs),
        }
    }
}

fn default_providers() -> Vec<ProviderSettings> {
    vec![
        ProviderSettings::new("gemini", ProviderKind::GeminiText, "gemini-2.0-flash", "GEMINI_API_KEY"),
        ProviderSettings::new("openai", ProviderKind::OpenAiCompatible, "gpt-4o-mini", "OPENAI_API_KEY"),
        ProviderSettings::new(
            "nanobanana",
            ProviderKind::NanoBanana,
            "gemini-2.5-flash-image",
            "GEMINI_API_KEY",
        ),
        ProviderSettings::new("seedance", ProviderKind::Seedance, "seedream-3.0", "SEEDANCE_API_KEY"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_falls_back_to_default() {
        let mut provider = ProviderSettings::new("gemini", ProviderKind::GeminiText, "m", "KEY");
        provider.window_secs = 0;
        assert_eq!(provider.window(), Duration::from_secs(60));
        provider.window_secs = 5;
        assert_eq!(provider.window(), Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let settings: OrchestratorSettings = toml::from_str("").unwrap();
        assert_eq!(settings.request_timeout_secs, 60);
        assert_eq!(settings.retry.max_retries, 3);
        assert_eq!(settings.retry.base_delay_ms, 1_000);
        assert_eq!(settings.cache.image, 86_400);
        assert_eq!(settings.routing.image, vec!["nanobanana", "seedance"]);
        assert_eq!(settings.providers.len(), 4);
        assert!(settings.provider("seedance").is_some());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let toml_str = r#"
request_timeout_secs = 15

[retry]
max_retries = 1

[cache]
bio = 60

[routing]
bio = ["openai"]
"#;
        let settings: OrchestratorSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.retry.max_retries, 1);
        assert_eq!(settings.retry.rate_limit_cooldown_ms, 60_000);
        assert_eq!(settings.cache.bio, 60);
        assert_eq!(settings.cache.prompt_variations, 1_800);
        assert_eq!(settings.routing.bio, vec!["openai"]);
        assert_eq!(settings.routing.prompt, vec!["gemini", "openai"]);
    }

    #[test]
    fn test_providers_table_replaces_defaults() {
        let toml_str = r#"
[[providers]]
name = "local"
kind = "openai_compatible"
model = "llama3"
base_url = "http://localhost:11434/v1"
api_key_env = "LOCAL_KEY"
requests_per_window = 5
"#;
        let settings: OrchestratorSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.providers.len(), 1);
        let local = &settings.providers[0];
        assert_eq!(local.kind, ProviderKind::OpenAiCompatible);
        assert_eq!(local.requests_per_window, 5);
        assert_eq!(local.window_secs, 60);
        assert!(local.enabled);
    }

    #[test]
    fn test_ttl_and_routing_lookup() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.cache.ttl_secs(OperationKind::ImageVariations), 86_400);
        assert_eq!(
            settings.routing.order_for(OperationKind::PromptAnalysis),
            settings.routing.prompt.as_slice()
        );
    }
}
