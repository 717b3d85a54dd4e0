//! Room reply pipeline.
//!
//! An inbound human message flows through mention parsing, per-role
//! reply generation, concurrent fan-out with address-order persistence,
//! and after-the-fact attribution over the stored log.

pub mod attribution;
pub mod context;
pub mod orchestrator;
pub mod reply;

pub use attribution::attribute_generated;
pub use context::RoleContextBuilder;
pub use orchestrator::RoomOrchestrator;
pub use reply::{ReplyGenerator, ReplyInput, failure_reply};
