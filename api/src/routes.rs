//! Route table and middleware assembly.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body; note images travel inline.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root))
        .route("/create-account", post(handlers::create_account))
        .route("/verify-email", get(handlers::verify_email))
        .route("/login", post(handlers::login))
        .route("/get-user", get(handlers::get_user))
        .route("/add-note", post(handlers::add_note))
        .route("/edit-note/{note_id}", put(handlers::edit_note))
        .route("/update-note-pinned/{note_id}", put(handlers::update_note_pinned))
        .route("/get-all-notes", get(handlers::get_all_notes))
        .route("/delete-note/{note_id}", delete(handlers::delete_note))
        .route("/search-notes", get(handlers::search_notes))
        .route("/auth/google", get(handlers::google_auth))
        .route("/auth/google/callback", get(handlers::google_callback))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "data": "hello" }))
}
