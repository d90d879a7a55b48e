//! Provider abstractions.
//!
//! - `GenerationProvider`: RPITIT trait implemented by concrete backends
//! - `BoxGenerationProvider`: object-safe wrapper for runtime selection
//! - `ProviderAdapter`: retry, liveness and quota view around one backend
//! - `ProviderRegistry`: name-indexed adapters in registration order

pub mod adapter;
pub mod box_provider;
pub mod health;
#[allow(clippy::module_inception)]
pub mod provider;
pub mod registry;

pub use adapter::ProviderAdapter;
pub use box_provider::BoxGenerationProvider;
pub use provider::GenerationProvider;
pub use registry::ProviderRegistry;
