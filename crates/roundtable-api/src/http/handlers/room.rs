//! Room and message handlers for the REST API.
//!
//! Posting a message stores it, acknowledges immediately, and (in a
//! task room) dispatches reply orchestration as a detached task. The
//! message listing annotates each entry after the fact: mention tokens
//! for human messages, the originating role for generated ones.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use roundtable_core::mention::{parse_mentions, resolve_mentions};
use roundtable_core::repository::{MessageRepository, RoleRepository};
use roundtable_core::room::attribute_generated;
use roundtable_core::service::room::CreateRoomRequest;
use roundtable_types::message::{AuthorKind, Message};
use roundtable_types::room::RoomId;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for POST /api/v1/rooms.
#[derive(Debug, Deserialize)]
pub struct CreateRoomBody {
    pub title: String,
    #[serde(default = "default_task_room")]
    pub task_room: bool,
    #[serde(default)]
    pub assigned_roles: Vec<String>,
}

fn default_task_room() -> bool {
    true
}

/// Body for PATCH /api/v1/rooms/:id.
#[derive(Debug, Deserialize)]
pub struct RenameRoomBody {
    pub title: String,
}

/// Body for PUT /api/v1/rooms/:id/roles.
#[derive(Debug, Deserialize)]
pub struct AssignRolesBody {
    pub roles: Vec<String>,
}

/// Body for POST /api/v1/rooms/:id/messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub content: String,
}

/// A message enriched with reconstructed addressing information.
#[derive(Debug, Serialize)]
pub struct AnnotatedMessage {
    #[serde(flatten)]
    pub message: Message,
    /// Valid role names addressed by a human message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentioned_roles: Vec<String>,
    /// Role a generated message is attributed to, when reconstructable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originating_role: Option<String>,
}

fn parse_room_id(raw: &str) -> Result<RoomId, AppError> {
    raw.parse::<RoomId>()
        .map_err(|_| AppError::Validation(format!("invalid room id '{raw}'")))
}

/// POST /api/v1/rooms - Create a room.
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let room = state
        .room_service
        .create(CreateRoomRequest {
            title: body.title,
            task_room: body.task_room,
            assigned_roles: body.assigned_roles,
        })
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let room_json = serde_json::to_value(&room)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(room_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/rooms/{}", room.id))
        .with_link("messages", &format!("/api/v1/rooms/{}/messages", room.id)))
}

/// GET /api/v1/rooms - List rooms, newest first.
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let rooms = state.room_service.list().await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let rooms_json = serde_json::to_value(&rooms)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(rooms_json, request_id, elapsed).with_link("self", "/api/v1/rooms"))
}

/// GET /api/v1/rooms/:id - Get a room.
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let room = state.room_service.get(&parse_room_id(&id)?).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let room_json = serde_json::to_value(&room)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(room_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/rooms/{}", room.id))
        .with_link("messages", &format!("/api/v1/rooms/{}/messages", room.id)))
}

/// PATCH /api/v1/rooms/:id - Rename a room.
pub async fn rename_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameRoomBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let room = state
        .room_service
        .rename(&parse_room_id(&id)?, &body.title)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let room_json = serde_json::to_value(&room)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(room_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/rooms/{}", room.id)))
}

/// PUT /api/v1/rooms/:id/roles - Replace the assigned role list.
pub async fn assign_roles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignRolesBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let room = state
        .room_service
        .assign_roles(&parse_room_id(&id)?, body.roles)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let room_json = serde_json::to_value(&room)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(room_json, request_id, elapsed))
}

/// DELETE /api/v1/rooms/:id/messages - Delete all messages in the room.
pub async fn clear_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let removed = state.room_service.clear_messages(&parse_room_id(&id)?).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({"cleared": removed}),
        request_id,
        elapsed,
    ))
}

/// DELETE /api/v1/rooms/:id - Delete a room and its messages.
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    state.room_service.delete(&parse_room_id(&id)?).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({"deleted": true, "id": id}),
        request_id,
        elapsed,
    ))
}

/// POST /api/v1/rooms/:id/messages - Store a human message and, in a
/// task room, dispatch reply generation as a detached task.
///
/// The response acknowledges the stored message; replies land in the
/// log asynchronously and are picked up by the next listing.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PostMessageBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "message content must not be empty".to_string(),
        ));
    }

    let room = state.room_service.get(&parse_room_id(&id)?).await?;
    let message = Message::human(room.id, content);
    state.messages.append(&message).await?;

    if room.task_room {
        let orchestrator = state.orchestrator.clone();
        let room = room.clone();
        let trigger = message.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.handle_message(&room, &trigger).await {
                tracing::error!(room_id = %room.id, error = %err, "reply orchestration failed");
            }
        });
    }

    let elapsed = start.elapsed().as_millis() as u64;
    let message_json = serde_json::to_value(&message)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ApiResponse::success(
        serde_json::json!({"message": message_json, "replies_pending": room.task_room}),
        request_id,
        elapsed,
    )
    .with_link("messages", &format!("/api/v1/rooms/{}/messages", room.id)))
}

/// GET /api/v1/rooms/:id/messages - List the room log, oldest first,
/// annotated with mention and attribution data.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<AnnotatedMessage>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let room = state.room_service.get(&parse_room_id(&id)?).await?;
    let messages = state.messages.list_for_room(&room.id).await?;
    let known_names: Vec<String> = state
        .roles
        .list()
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();

    let origins = attribute_generated(&messages, &known_names);
    let annotated: Vec<AnnotatedMessage> = messages
        .into_iter()
        .zip(origins)
        .map(|(message, origin)| {
            let mentioned_roles = match message.author {
                AuthorKind::Human => {
                    resolve_mentions(&parse_mentions(&message.content), &known_names)
                }
                AuthorKind::Generated => Vec::new(),
            };
            AnnotatedMessage {
                message,
                mentioned_roles,
                originating_role: origin,
            }
        })
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(annotated, request_id, elapsed)
        .with_link("room", &format!("/api/v1/rooms/{}", room.id)))
}
