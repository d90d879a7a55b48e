//! SQLite persistence for generation history.

pub mod generation_log;
pub mod pool;
