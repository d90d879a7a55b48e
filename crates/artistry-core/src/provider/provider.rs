//! GenerationProvider trait definition.
//!
//! The abstraction every upstream backend implements. Uses RPITIT for the
//! async methods; `BoxGenerationProvider` supplies dynamic dispatch.

use std::future::Future;

use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

/// Trait for generation backends (Gemini, OpenAI-compatible, image APIs).
///
/// Implementations live in artistry-infra. A backend makes exactly one
/// upstream call per `generate`; retries and fallback happen above it.
pub trait GenerationProvider: Send + Sync {
    /// Name used in routing lists (e.g. "gemini", "seedance").
    fn name(&self) -> &str;

    fn capability(&self) -> Capability;

    /// Whether the backend has the credential it needs.
    fn is_configured(&self) -> bool;

    /// Issue one generation call.
    fn generate(
        &self,
        request: &ProviderRequest,
    ) -> impl Future<Output = Result<ProviderOutput, ProviderError>> + Send;

    /// Lightweight liveness check that does not generate anything.
    fn probe(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;
}
