//! Request authorization gate.
//!
//! Every protected route runs through this extractor before any handler
//! logic: it reads the bearer token from the `Authorization` header and
//! verifies signature and expiry. Any failure, including an absent or
//! expired token, short-circuits to a 401 without touching storage.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;
        let user_id = state.tokens.verify(token).ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser { user_id })
    }
}
