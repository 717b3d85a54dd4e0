//! Administrative services.
//!
//! Role, room, and stored-ability management. Services own the
//! validation rules; repositories stay mechanical.

pub mod ability;
pub mod role;
pub mod room;

pub use ability::AbilityService;
pub use role::RoleService;
pub use room::RoomService;
