//! Message repository trait definition.

use roundtable_types::error::RepositoryError;
use roundtable_types::message::{Message, MessageId};
use roundtable_types::room::RoomId;

/// Repository trait for the flat message log.
///
/// Messages are append-only: there is no update operation, and removal
/// happens only through `clear_room` or a room's cascade delete.
pub trait MessageRepository: Send + Sync {
    /// Append a message to its room's log. Returns the stored message.
    fn append(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Get a message by ID.
    fn get_by_id(
        &self,
        id: &MessageId,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// List a room's messages in insertion order (oldest first).
    fn list_for_room(
        &self,
        room_id: &RoomId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// List the most recent `limit` messages of a room, still oldest
    /// first within the returned window.
    fn list_recent(
        &self,
        room_id: &RoomId,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Delete all messages in a room. Returns the number removed.
    fn clear_room(
        &self,
        room_id: &RoomId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
