//! Name-indexed provider adapters.

use std::collections::HashMap;
use std::sync::Arc;

use super::adapter::ProviderAdapter;

/// Registry of adapters, indexed by name, remembering registration order.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<String, Arc<ProviderAdapter>>,
    order: Vec<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its provider name, replacing any previous one.
    pub fn register(&mut self, adapter: ProviderAdapter) {
        let name = adapter.name().to_string();
        if !self.adapters.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.adapters.insert(name, Arc::new(adapter));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ProviderAdapter>> {
        self.adapters.get(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Adapters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProviderAdapter>> {
        self.order.iter().filter_map(|name| self.adapters.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BoxGenerationProvider;
    use crate::rate_limit::RateLimiter;
    use crate::retry::RetryPolicy;
    use crate::test_support::ScriptedProvider;
    use artistry_types::provider::Capability;
    use std::time::Duration;

    fn adapter(name: &str, content: &str) -> ProviderAdapter {
        ProviderAdapter::new(
            BoxGenerationProvider::new(ScriptedProvider::ok(name, Capability::Text, content)),
            RetryPolicy::none(),
            Arc::new(RateLimiter::default()),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_register_keeps_order_and_replaces() {
        let mut registry = ProviderRegistry::new();
        registry.register(adapter("openai", "a"));
        registry.register(adapter("gemini", "b"));
        registry.register(adapter("openai", "c"));

        assert_eq!(registry.names(), ["openai".to_string(), "gemini".to_string()]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("gemini").is_some());
        assert!(registry.get("seedance").is_none());
        let names: Vec<&str> = registry.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["openai", "gemini"]);
    }
}
