//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use roundtable_types::error::{AbilityError, RepositoryError, RoleError, RoomError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Role-related errors.
    Role(RoleError),
    /// Room-related errors.
    Room(RoomError),
    /// Ability-related errors.
    Ability(AbilityError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<RoleError> for AppError {
    fn from(e: RoleError) -> Self {
        AppError::Role(e)
    }
}

impl From<RoomError> for AppError {
    fn from(e: RoomError) -> Self {
        AppError::Room(e)
    }
}

impl From<AbilityError> for AppError {
    fn from(e: AbilityError) -> Self {
        AppError::Ability(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::Validation("entity not found".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Role(RoleError::NotFound) => (
                StatusCode::NOT_FOUND,
                "ROLE_NOT_FOUND",
                "Role not found".to_string(),
            ),
            AppError::Role(RoleError::NameConflict(name)) => (
                StatusCode::CONFLICT,
                "NAME_CONFLICT",
                format!("Role '{name}' already exists"),
            ),
            AppError::Role(
                e @ (RoleError::InvalidName(_)
                | RoleError::InvalidStatus(_)
                | RoleError::UnknownAbility(_)),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Role(e) => (StatusCode::INTERNAL_SERVER_ERROR, "ROLE_ERROR", e.to_string()),

            AppError::Room(RoomError::NotFound) => (
                StatusCode::NOT_FOUND,
                "ROOM_NOT_FOUND",
                "Room not found".to_string(),
            ),
            AppError::Room(e @ (RoomError::UnknownAssignedRole(_) | RoomError::EmptyTitle)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Room(e) => (StatusCode::INTERNAL_SERVER_ERROR, "ROOM_ERROR", e.to_string()),

            AppError::Ability(AbilityError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "ABILITY_NOT_FOUND",
                format!("Ability '{id}' not found"),
            ),
            AppError::Ability(AbilityError::IdConflict(id)) => (
                StatusCode::CONFLICT,
                "ID_CONFLICT",
                format!("Ability '{id}' already exists"),
            ),
            AppError::Ability(
                e @ (AbilityError::BuiltinImmutable | AbilityError::ConfiguredImmutable(_)),
            ) => (StatusCode::CONFLICT, "IMMUTABLE_ABILITY", e.to_string()),
            AppError::Ability(
                e @ (AbilityError::NoTemplate(_)
                | AbilityError::MissingParameter { .. }
                | AbilityError::UnsafeArgument { .. }),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Ability(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ABILITY_ERROR",
                e.to_string(),
            ),

            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
