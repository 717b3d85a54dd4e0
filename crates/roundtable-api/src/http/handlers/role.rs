//! Role CRUD and prompt history handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Deserializer};

use roundtable_core::service::role::{CreateRoleRequest, UpdateRoleRequest};
use roundtable_types::role::RoleStatus;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for POST /api/v1/roles.
#[derive(Debug, Deserialize)]
pub struct CreateRoleBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub preferred_model: Option<String>,
}

/// Body for PUT /api/v1/roles/:name. Absent fields stay unchanged;
/// `"preferred_model": null` clears the preference.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub abilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub preferred_model: Option<Option<String>>,
}

/// Distinguish an absent field (outer None) from an explicit null
/// (outer Some, inner None).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// POST /api/v1/roles - Create a role with prompt version 1.
pub async fn create_role(
    State(state): State<AppState>,
    Json(body): Json<CreateRoleBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let role = state
        .role_service
        .create(CreateRoleRequest {
            name: body.name,
            description: body.description,
            prompt: body.prompt,
            abilities: body.abilities,
            preferred_model: body.preferred_model,
        })
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let role_json = serde_json::to_value(&role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(role_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/roles/{}", role.name))
        .with_link("prompts", &format!("/api/v1/roles/{}/prompts", role.name));

    Ok(resp)
}

/// GET /api/v1/roles - List all roles.
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let roles = state.role_service.list().await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let roles_json = serde_json::to_value(&roles)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(roles_json, request_id, elapsed).with_link("self", "/api/v1/roles"))
}

/// GET /api/v1/roles/:name - Get a role by name.
pub async fn get_role(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let role = state.role_service.get(&name).await?;
    let latest = state.role_service.latest_prompt(&name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let mut role_json = serde_json::to_value(&role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if let Some(obj) = role_json.as_object_mut() {
        obj.insert(
            "prompt_version".to_string(),
            latest.map_or(serde_json::Value::Null, |v| v.version.into()),
        );
    }

    let resp = ApiResponse::success(role_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/roles/{}", role.name))
        .with_link("prompts", &format!("/api/v1/roles/{}/prompts", role.name));
    Ok(resp)
}

/// PUT /api/v1/roles/:name - Update a role; a new prompt appends the
/// next version.
pub async fn update_role(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpdateRoleBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let status = match body.status {
        Some(s) => Some(
            s.parse::<RoleStatus>()
                .map_err(AppError::Validation)?,
        ),
        None => None,
    };

    let role = state
        .role_service
        .update(
            &name,
            UpdateRoleRequest {
                description: body.description,
                status,
                prompt: body.prompt,
                abilities: body.abilities,
                preferred_model: body.preferred_model,
            },
        )
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let role_json = serde_json::to_value(&role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(role_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/roles/{}", role.name)))
}

/// DELETE /api/v1/roles/:name - Delete a role and its prompt history.
pub async fn delete_role(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    state.role_service.delete(&name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({"deleted": true, "name": name}),
        request_id,
        elapsed,
    ))
}

/// GET /api/v1/roles/:name/prompts - Full prompt version history,
/// ascending by version.
pub async fn prompt_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let versions = state.role_service.prompt_history(&name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let versions_json = serde_json::to_value(&versions)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(versions_json, request_id, elapsed)
        .with_link("role", &format!("/api/v1/roles/{name}")))
}
