//! REST API request handlers.

pub mod ability;
pub mod role;
pub mod room;
