//! SQLite message repository implementation.
//!
//! The message log is append-only. Ordering uses created_at with the
//! time-sortable id as tiebreaker so two replies persisted within the
//! same instant keep their insertion order.

use sqlx::Row;

use roundtable_core::repository::MessageRepository;
use roundtable_types::error::RepositoryError;
use roundtable_types::message::{AuthorKind, Message, MessageId};
use roundtable_types::room::RoomId;

use super::pool::DatabasePool;
use super::role::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Message, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let room_id: String = row
        .try_get("room_id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let author: String = row
        .try_get("author")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Message {
        id: id
            .parse::<MessageId>()
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?,
        room_id: room_id
            .parse::<RoomId>()
            .map_err(|e| RepositoryError::Query(format!("invalid room id: {e}")))?,
        author: author
            .parse::<AuthorKind>()
            .map_err(RepositoryError::Query)?,
        content: row
            .try_get("content")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        model: row
            .try_get("model")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl MessageRepository for SqliteMessageRepository {
    async fn append(&self, message: &Message) -> Result<Message, RepositoryError> {
        sqlx::query(
            "INSERT INTO messages (id, room_id, author, content, model, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.room_id.to_string())
        .bind(message.author.to_string())
        .bind(&message.content)
        .bind(&message.model)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(message.clone())
    }

    async fn get_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| message_from_row(&row)).transpose()
    }

    async fn list_for_room(&self, room_id: &RoomId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE room_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(room_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn list_recent(
        &self,
        room_id: &RoomId,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM (
                 SELECT * FROM messages WHERE room_id = ?
                 ORDER BY created_at DESC, id DESC LIMIT ?
             ) ORDER BY created_at ASC, id ASC",
        )
        .bind(room_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn clear_room(&self, room_id: &RoomId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE room_id = ?")
            .bind(room_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
