//! SQLite room repository implementation.

use sqlx::Row;

use roundtable_core::repository::RoomRepository;
use roundtable_types::error::RepositoryError;
use roundtable_types::room::{Room, RoomId};

use super::pool::DatabasePool;
use super::role::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `RoomRepository`.
pub struct SqliteRoomRepository {
    pool: DatabasePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn room_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Room, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let id = id
        .parse::<RoomId>()
        .map_err(|e| RepositoryError::Query(format!("invalid room id: {e}")))?;

    let assigned: String = row
        .try_get("assigned_roles")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let assigned_roles: Vec<String> = serde_json::from_str(&assigned)
        .map_err(|e| RepositoryError::Query(format!("invalid assigned_roles JSON: {e}")))?;

    let task_room: i64 = row
        .try_get("task_room")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Room {
        id,
        title: row
            .try_get("title")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        task_room: task_room != 0,
        assigned_roles,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

impl RoomRepository for SqliteRoomRepository {
    async fn create(&self, room: &Room) -> Result<Room, RepositoryError> {
        let assigned_json = serde_json::to_string(&room.assigned_roles)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO rooms (id, title, task_room, assigned_roles, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(room.id.to_string())
        .bind(&room.title)
        .bind(room.task_room as i64)
        .bind(&assigned_json)
        .bind(format_datetime(&room.created_at))
        .bind(format_datetime(&room.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(room.clone())
    }

    async fn get_by_id(&self, id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| room_from_row(&row)).transpose()
    }

    async fn list(&self) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM rooms ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(room_from_row).collect()
    }

    async fn update(&self, room: &Room) -> Result<Room, RepositoryError> {
        let assigned_json = serde_json::to_string(&room.assigned_roles)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE rooms SET title = ?, task_room = ?, assigned_roles = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&room.title)
        .bind(room.task_room as i64)
        .bind(&assigned_json)
        .bind(format_datetime(&room.updated_at))
        .bind(room.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(room.clone())
    }

    async fn delete(&self, id: &RoomId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
