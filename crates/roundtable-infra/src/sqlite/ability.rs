//! SQLite stored-ability repository implementation.
//!
//! An ability row carries either a command token list (JSON) or a
//! prompt template; exactly one is non-null. The dialogue built-in is
//! never stored here.

use sqlx::Row;

use roundtable_core::repository::StoredAbilityRepository;
use roundtable_types::ability::{Ability, AbilityKind};
use roundtable_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `StoredAbilityRepository`.
#[derive(Clone)]
pub struct SqliteStoredAbilityRepository {
    pool: DatabasePool,
}

impl SqliteStoredAbilityRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn ability_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Ability, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let command: Option<String> = row
        .try_get("command")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let prompt_template: Option<String> = row
        .try_get("prompt_template")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    let kind = match (command, prompt_template) {
        (Some(json), _) => {
            let template: Vec<String> = serde_json::from_str(&json)
                .map_err(|e| RepositoryError::Query(format!("invalid command JSON: {e}")))?;
            AbilityKind::Command { template }
        }
        (None, Some(template)) => AbilityKind::Prompt { template },
        (None, None) => {
            return Err(RepositoryError::Query(format!(
                "stored ability '{id}' has no template"
            )));
        }
    };

    Ok(Ability {
        id,
        name: row
            .try_get("name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        description: row
            .try_get("description")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        kind,
    })
}

fn template_columns(
    ability: &Ability,
) -> Result<(Option<String>, Option<String>), RepositoryError> {
    match &ability.kind {
        AbilityKind::Command { template } => {
            let json = serde_json::to_string(template)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok((Some(json), None))
        }
        AbilityKind::Prompt { template } => Ok((None, Some(template.clone()))),
        AbilityKind::Dialogue => Err(RepositoryError::Query(
            "the dialogue ability cannot be stored".to_string(),
        )),
    }
}

impl StoredAbilityRepository for SqliteStoredAbilityRepository {
    async fn create(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
        let (command, prompt_template) = template_columns(ability)?;

        let result = sqlx::query(
            "INSERT INTO stored_abilities (id, name, description, command, prompt_template)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&ability.id)
        .bind(&ability.name)
        .bind(&ability.description)
        .bind(&command)
        .bind(&prompt_template)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(ability.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("ability '{}' already exists", ability.id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Ability>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM stored_abilities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| ability_from_row(&row)).transpose()
    }

    async fn list(&self) -> Result<Vec<Ability>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM stored_abilities ORDER BY id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(ability_from_row).collect()
    }

    async fn update(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
        let (command, prompt_template) = template_columns(ability)?;

        let result = sqlx::query(
            "UPDATE stored_abilities SET name = ?, description = ?, command = ?, prompt_template = ?
             WHERE id = ?",
        )
        .bind(&ability.name)
        .bind(&ability.description)
        .bind(&command)
        .bind(&prompt_template)
        .bind(&ability.id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(ability.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stored_abilities WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
