//! Model adapter seam.
//!
//! Reply generation and prompt abilities call the model backend through
//! [`ModelAdapter`]; the HTTP implementation lives in roundtable-infra.

pub mod adapter;
pub mod boxed;

pub use adapter::ModelAdapter;
pub use boxed::BoxModelAdapter;
