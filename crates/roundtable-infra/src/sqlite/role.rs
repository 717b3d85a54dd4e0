//! SQLite role repository implementation.
//!
//! Implements `RoleRepository` from `roundtable-core` using sqlx with
//! split read/write pools. Prompt versions live in their own table with
//! a composite (role_name, version) key; deleting a role cascades.

use chrono::{DateTime, Utc};
use sqlx::Row;

use roundtable_core::repository::RoleRepository;
use roundtable_types::error::RepositoryError;
use roundtable_types::role::{PromptVersion, Role, RoleStatus};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `RoleRepository`.
pub struct SqliteRoleRepository {
    pool: DatabasePool,
}

impl SqliteRoleRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Role.
struct RoleRow {
    name: String,
    description: String,
    status: String,
    abilities: String,
    preferred_model: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RoleRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            abilities: row.try_get("abilities")?,
            preferred_model: row.try_get("preferred_model")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_role(self) -> Result<Role, RepositoryError> {
        let status: RoleStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let abilities: Vec<String> = serde_json::from_str(&self.abilities)
            .map_err(|e| RepositoryError::Query(format!("invalid abilities JSON: {e}")))?;

        Ok(Role {
            name: self.name,
            description: self.description,
            status,
            abilities,
            preferred_model: self.preferred_model,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl RoleRepository for SqliteRoleRepository {
    async fn create(&self, role: &Role) -> Result<Role, RepositoryError> {
        let abilities_json = serde_json::to_string(&role.abilities)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO roles (name, description, status, abilities, preferred_model, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.status.to_string())
        .bind(&abilities_json)
        .bind(&role.preferred_model)
        .bind(format_datetime(&role.created_at))
        .bind(format_datetime(&role.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(role.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("role '{}' already exists", role.name)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let role_row =
                    RoleRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(role_row.into_role()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                RoleRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_role()
            })
            .collect()
    }

    async fn update(&self, role: &Role) -> Result<Role, RepositoryError> {
        let abilities_json = serde_json::to_string(&role.abilities)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE roles SET description = ?, status = ?, abilities = ?, preferred_model = ?, updated_at = ?
             WHERE name = ?",
        )
        .bind(&role.description)
        .bind(role.status.to_string())
        .bind(&abilities_json)
        .bind(&role.preferred_model)
        .bind(format_datetime(&role.updated_at))
        .bind(&role.name)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(role.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM roles WHERE name = ?")
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn append_prompt_version(
        &self,
        version: &PromptVersion,
    ) -> Result<PromptVersion, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO prompt_versions (role_name, version, content, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&version.role_name)
        .bind(version.version)
        .bind(&version.content)
        .bind(format_datetime(&version.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(version.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "version {} for role '{}' already exists",
                    version.version, version.role_name
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn latest_prompt_version(
        &self,
        role_name: &str,
    ) -> Result<Option<PromptVersion>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM prompt_versions WHERE role_name = ? ORDER BY version DESC LIMIT 1",
        )
        .bind(role_name)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| prompt_version_from_row(&row)).transpose()
    }

    async fn list_prompt_versions(
        &self,
        role_name: &str,
    ) -> Result<Vec<PromptVersion>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM prompt_versions WHERE role_name = ? ORDER BY version ASC")
                .bind(role_name)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(prompt_version_from_row).collect()
    }
}

fn prompt_version_from_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PromptVersion, RepositoryError> {
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(PromptVersion {
        role_name: row
            .try_get("role_name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        version: row
            .try_get("version")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}
