//! Ability handlers: merged-namespace reads, stored-layer writes.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use roundtable_core::service::ability::UpsertAbilityRequest;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for POST /api/v1/abilities and PUT /api/v1/abilities/:id.
/// Exactly one of `command` and `prompt_template` must be set.
#[derive(Debug, Deserialize)]
pub struct UpsertAbilityBody {
    /// Required on create; on update the path segment wins.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub prompt_template: Option<String>,
}

/// GET /api/v1/abilities - List the merged namespace with the layer
/// each definition resolved from.
pub async fn list_abilities(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let abilities = state.ability_service.list().await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let abilities_json = serde_json::to_value(&abilities)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(abilities_json, request_id, elapsed)
        .with_link("self", "/api/v1/abilities"))
}

/// GET /api/v1/abilities/:id - Resolve one identifier.
pub async fn get_ability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let resolved = state.ability_service.resolve(&id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resolved_json = serde_json::to_value(&resolved)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(resolved_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/abilities/{id}")))
}

/// POST /api/v1/abilities - Create a stored ability.
pub async fn create_ability(
    State(state): State<AppState>,
    Json(body): Json<UpsertAbilityBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let Some(id) = body.id.clone() else {
        return Err(AppError::Validation("ability id is required".to_string()));
    };
    upsert(state, id, body, false).await
}

/// PUT /api/v1/abilities/:id - Replace a stored ability.
pub async fn update_ability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpsertAbilityBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    upsert(state, id, body, true).await
}

async fn upsert(
    state: AppState,
    id: String,
    body: UpsertAbilityBody,
    replace: bool,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let request = UpsertAbilityRequest {
        id: id.clone(),
        name: body.name,
        description: body.description,
        command: body.command,
        prompt_template: body.prompt_template,
    };
    let ability = if replace {
        state.ability_service.update(request).await?
    } else {
        state.ability_service.create(request).await?
    };
    let elapsed = start.elapsed().as_millis() as u64;

    let ability_json = serde_json::to_value(&ability)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(ability_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/abilities/{id}")))
}

/// DELETE /api/v1/abilities/:id - Delete a stored ability.
pub async fn delete_ability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    state.ability_service.delete(&id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({"deleted": true, "id": id}),
        request_id,
        elapsed,
    ))
}
