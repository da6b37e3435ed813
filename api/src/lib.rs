//! HTTP layer: axum router, request handlers, bearer-token authorization,
//! the Google OAuth flow, and the verification mail seam.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
