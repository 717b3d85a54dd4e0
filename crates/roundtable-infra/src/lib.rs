//! Infrastructure layer for Roundtable.
//!
//! SQLite implementations of the roundtable-core repository traits, the
//! HTTP model adapter, and the global config loader.

pub mod config;
pub mod model;
pub mod sqlite;
