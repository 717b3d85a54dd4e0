//! Room repository trait definition.

use roundtable_types::error::RepositoryError;
use roundtable_types::room::{Room, RoomId};

/// Repository trait for room persistence.
///
/// Implementations live in roundtable-infra (e.g., SqliteRoomRepository).
pub trait RoomRepository: Send + Sync {
    /// Create a new room. Returns the created room.
    fn create(
        &self,
        room: &Room,
    ) -> impl std::future::Future<Output = Result<Room, RepositoryError>> + Send;

    /// Get a room by ID.
    fn get_by_id(
        &self,
        id: &RoomId,
    ) -> impl std::future::Future<Output = Result<Option<Room>, RepositoryError>> + Send;

    /// List all rooms, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Room>, RepositoryError>> + Send;

    /// Update a room's title and assigned roles. Returns the updated room.
    fn update(
        &self,
        room: &Room,
    ) -> impl std::future::Future<Output = Result<Room, RepositoryError>> + Send;

    /// Permanently delete a room and its messages.
    fn delete(
        &self,
        id: &RoomId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
