//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Registration, login, the model catalog,
//! and `/health` are public; everything else authenticates via the
//! `CurrentUser` extractor. Middleware: CORS, tracing.

use axum::routing::{get, post};
use axum::Router;
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
        // Model catalog
        .route("/models", get(handlers::model::list_models))
        // Conversations
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        // Messages
        .route("/messages/{id}/reply", post(handlers::message::send_reply))
        .route(
            "/messages/{id}/children",
            get(handlers::message::get_children),
        )
        // Accounts
        .route("/users", post(handlers::user::register))
        .route("/auth/login", post(handlers::user::login))
        .route(
            "/users/me",
            get(handlers::user::me)
                .put(handlers::user::update_me)
                .delete(handlers::user::delete_me),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
