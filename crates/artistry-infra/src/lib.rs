//! Infrastructure layer for Artistry.
//!
//! Contains implementations of the ports defined in `artistry-core`:
//! reqwest-based provider backends, the SQLite generation history store,
//! and the `config.toml` loader.

pub mod config;
pub mod provider;
pub mod sqlite;
