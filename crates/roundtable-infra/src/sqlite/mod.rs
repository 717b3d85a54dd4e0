//! SQLite persistence.

pub mod ability;
pub mod message;
pub mod pool;
pub mod role;
pub mod room;

pub use ability::SqliteStoredAbilityRepository;
pub use message::SqliteMessageRepository;
pub use pool::{DatabasePool, default_database_url};
pub use role::SqliteRoleRepository;
pub use room::SqliteRoomRepository;
