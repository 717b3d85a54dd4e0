//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Roles
        .route(
            "/roles",
            post(handlers::role::create_role).get(handlers::role::list_roles),
        )
        .route(
            "/roles/{name}",
            get(handlers::role::get_role)
                .put(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )
        .route("/roles/{name}/prompts", get(handlers::role::prompt_history))
        // Rooms
        .route(
            "/rooms",
            post(handlers::room::create_room).get(handlers::room::list_rooms),
        )
        .route(
            "/rooms/{id}",
            get(handlers::room::get_room)
                .patch(handlers::room::rename_room)
                .delete(handlers::room::delete_room),
        )
        .route("/rooms/{id}/roles", put(handlers::room::assign_roles))
        .route(
            "/rooms/{id}/messages",
            post(handlers::room::post_message)
                .get(handlers::room::list_messages)
                .delete(handlers::room::clear_messages),
        )
        // Abilities
        .route(
            "/abilities",
            get(handlers::ability::list_abilities).post(handlers::ability::create_ability),
        )
        .route(
            "/abilities/{id}",
            get(handlers::ability::get_ability)
                .put(handlers::ability::update_ability)
                .delete(handlers::ability::delete_ability),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
