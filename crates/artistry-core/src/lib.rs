//! Business logic and port definitions for artistry.
//!
//! Rate limiting, response caching, retry/backoff, the provider abstraction,
//! ordered fallback and the operation facades. The log store is a port that
//! `artistry-infra` implements; this crate never depends on HTTP or SQL
//! crates.

pub mod cache;
pub mod facade;
pub mod fallback;
pub mod log;
pub mod prompts;
pub mod provider;
pub mod rate_limit;
pub mod retry;
pub mod service;
pub mod synth;

#[cfg(test)]
pub(crate) mod test_support;
