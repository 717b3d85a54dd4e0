//! Shared domain types for Roundtable.
//!
//! Pure data: entities, identifiers, error enums, and config shapes.
//! No IO and no async -- every other crate in the workspace depends on
//! this one and nothing here depends back.

pub mod ability;
pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod role;
pub mod room;
