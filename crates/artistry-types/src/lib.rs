//! Shared domain types for artistry.
//!
//! Operation kinds, request and option shapes, generation results, attempt
//! errors, audit log records, status shapes and configuration structs used by
//! every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod generation;
pub mod log;
pub mod output;
pub mod provider;
pub mod request;
pub mod status;
