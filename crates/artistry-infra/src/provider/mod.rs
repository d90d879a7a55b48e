//! Provider backend implementations.
//!
//! Concrete [`GenerationProvider`](artistry_core::provider::GenerationProvider)
//! implementations over reqwest, plus a factory ([`create_provider`]) that
//! builds the right backend from a [`ProviderSettings`] entry.

pub mod gemini;
mod http;
pub mod nano_banana;
pub mod openai_compat;
pub mod seedance;

use std::time::Duration;

use secrecy::SecretString;

use artistry_core::provider::BoxGenerationProvider;
use artistry_types::config::{OrchestratorSettings, ProviderSettings};
use artistry_types::error::ProviderError;
use artistry_types::provider::ProviderKind;

use self::gemini::GeminiTextProvider;
use self::nano_banana::NanoBananaProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::seedance::SeedanceProvider;

/// Read a credential from the environment. Unset, blank or non-Unicode
/// values count as absent.
pub fn resolve_api_key(env_var: &str) -> Option<SecretString> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

/// Create a [`BoxGenerationProvider`] from its settings entry.
///
/// A missing `api_key` still yields a provider; it reports itself as not
/// configured and fails fast.
pub fn create_provider(
    settings: &ProviderSettings,
    api_key: Option<SecretString>,
    timeout: Duration,
) -> Result<BoxGenerationProvider, ProviderError> {
    let name = settings.name.clone();
    let model = settings.model.as_str();
    let base_url = settings.base_url.as_deref();

    let provider = match settings.kind {
        ProviderKind::GeminiText => BoxGenerationProvider::new(GeminiTextProvider::new(
            name, api_key, model, base_url, timeout,
        )?),
        ProviderKind::OpenAiCompatible => BoxGenerationProvider::new(
            OpenAiCompatibleProvider::new(name, api_key, model, base_url, timeout)?,
        ),
        ProviderKind::NanoBanana => BoxGenerationProvider::new(NanoBananaProvider::new(
            name, api_key, model, base_url, timeout,
        )?),
        ProviderKind::Seedance => BoxGenerationProvider::new(SeedanceProvider::new(
            name, api_key, model, base_url, timeout,
        )?),
    };
    Ok(provider)
}

/// Build every enabled provider in the settings, resolving keys from the
/// environment. Backends that fail to build are skipped with a warning.
pub fn create_providers(settings: &OrchestratorSettings) -> Vec<BoxGenerationProvider> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let mut providers = Vec::with_capacity(settings.providers.len());

    for entry in settings.providers.iter().filter(|p| p.enabled) {
        let api_key = resolve_api_key(&entry.api_key_env);
        if api_key.is_none() {
            tracing::debug!(
                provider = %entry.name,
                env = %entry.api_key_env,
                "no credential in environment; provider will be unavailable"
            );
        }
        match create_provider(entry, api_key, timeout) {
            Ok(provider) => providers.push(provider),
            Err(err) => {
                tracing::warn!(provider = %entry.name, error = %err, "failed to build provider");
            }
        }
    }
    providers
}
