//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure
//! layer (roundtable-infra) implements. The core crate never depends on
//! any specific storage technology.

pub mod ability;
pub mod message;
pub mod role;
pub mod room;

pub use ability::StoredAbilityRepository;
pub use message::MessageRepository;
pub use role::RoleRepository;
pub use room::RoomRepository;
