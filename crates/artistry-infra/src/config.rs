//! Configuration loader for Artistry.
//!
//! Reads `config.toml` from the data directory (`~/.artistry/` in production)
//! and deserializes it into [`OrchestratorSettings`]. Falls back to defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use artistry_types::config::OrchestratorSettings;

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory.
///
/// Priority:
/// 1. `ARTISTRY_DATA_DIR` environment variable
/// 2. `~/.artistry`
/// 3. `./.artistry`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ARTISTRY_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".artistry");
    }
    PathBuf::from(".artistry")
}

/// Load settings from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: logs a warning and returns defaults.
pub async fn load_settings(data_dir: &Path) -> OrchestratorSettings {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return OrchestratorSettings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return OrchestratorSettings::default();
        }
    };

    match toml::from_str::<OrchestratorSettings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            OrchestratorSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_types::provider::ProviderKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_settings_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.request_timeout_secs, 60);
        assert_eq!(settings.providers.len(), 4);
    }

    #[tokio::test]
    async fn load_settings_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
health_check_ttl_secs = 30

[routing]
image = ["seedance"]

[[providers]]
name = "seedance"
kind = "seedance"
model = "seedream-3.0"
api_key_env = "SEEDANCE_API_KEY"
requests_per_window = 5
"#,
        )
        .await
        .unwrap();

        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.health_check_ttl_secs, 30);
        assert_eq!(settings.routing.image, vec!["seedance"]);
        assert_eq!(settings.providers.len(), 1);
        assert_eq!(settings.providers[0].kind, ProviderKind::Seedance);
        assert_eq!(settings.providers[0].requests_per_window, 5);
        assert_eq!(settings.providers[0].window_secs, 60);
        assert!(settings.providers[0].enabled);
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.retry.max_retries, 3);
        assert_eq!(settings.providers.len(), 4);
    }

    #[test]
    fn resolve_data_dir_ends_with_artistry() {
        let dir = resolve_data_dir();
        if std::env::var("ARTISTRY_DATA_DIR").is_err() {
            assert!(dir.ends_with(".artistry"));
        }
    }
}
