//! Domain logic for Roundtable.
//!
//! Mention parsing, ability resolution and execution, role context
//! assembly, reply generation, room orchestration, and attribution
//! reconstruction. Storage and model backends are reached only through
//! the trait seams in [`repository`] and [`model`]; implementations
//! live in roundtable-infra.

pub mod ability;
pub mod intent;
pub mod mention;
pub mod model;
pub mod repository;
pub mod room;
pub mod service;
