//! BoxGenerationProvider -- object-safe dynamic dispatch wrapper.
//!
//! 1. `GenerationProviderDyn` mirrors the trait with boxed futures
//! 2. Blanket impl for every `T: GenerationProvider`
//! 3. `BoxGenerationProvider` wraps `Box<dyn GenerationProviderDyn>`

use std::future::Future;
use std::pin::Pin;

use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use super::provider::GenerationProvider;

/// Object-safe version of [`GenerationProvider`] with boxed futures.
pub trait GenerationProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn capability(&self) -> Capability;

    fn is_configured(&self) -> bool;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderOutput, ProviderError>> + Send + 'a>>;

    fn probe_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), ProviderError>> + Send + '_>>;
}

impl<T: GenerationProvider> GenerationProviderDyn for T {
    fn name(&self) -> &str {
        GenerationProvider::name(self)
    }

    fn capability(&self) -> Capability {
        GenerationProvider::capability(self)
    }

    fn is_configured(&self) -> bool {
        GenerationProvider::is_configured(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderOutput, ProviderError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }

    fn probe_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), ProviderError>> + Send + '_>> {
        Box::pin(self.probe())
    }
}

/// Type-erased generation backend for runtime provider selection.
pub struct BoxGenerationProvider {
    inner: Box<dyn GenerationProviderDyn>,
}

impl BoxGenerationProvider {
    pub fn new<T: GenerationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn capability(&self) -> Capability {
        self.inner.capability()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    pub async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        self.inner.generate_boxed(request).await
    }

    pub async fn probe(&self) -> Result<(), ProviderError> {
        self.inner.probe_boxed().await
    }
}

impl std::fmt::Debug for BoxGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxGenerationProvider")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .finish()
    }
}
