//! Registration, email verification, login, and profile handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::error;

use store::{NewUser, StoreError, UserDirectory, UserProfile};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn create_account(
    State(state): State<AppState>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::validation("Invalid request body"))?;
    let full_name = required(body.full_name, "Full Name is required")?;
    let email = required(body.email, "Email is required")?;
    let password = required(body.password, "Password is required")?;

    // An already-registered email is reported as a flagged 200, not a 400.
    if state.store.find_by_email(&email).await?.is_some() {
        return Ok(Json(MessageResponse::flagged("User already exist")));
    }

    let verification_token = fresh_token();
    let user = NewUser {
        full_name: full_name.clone(),
        email: email.clone(),
        password_hash: Some(hash_password(&password)?),
        google_id: None,
        is_verified: false,
        verification_token: Some(verification_token.clone()),
    };
    match state.store.insert_user(user).await {
        Ok(_) => {}
        Err(StoreError::DuplicateEmail) => {
            return Ok(Json(MessageResponse::flagged("User already exist")));
        }
        Err(err) => return Err(err.into()),
    }

    let verify_url = format!(
        "{}/verify-email?token={}",
        state.public_url, verification_token
    );
    if let Err(err) = state
        .mailer
        .send_verification(&email, &full_name, &verify_url)
        .await
    {
        error!("failed to send verification email to {email}: {err}");
        return Err(err.into());
    }

    Ok(Json(MessageResponse::ok(
        "Registration successful! Please check your email to verify your account.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Landing endpoint for the emailed link; replies with plain text meant
/// for the browser, not with the JSON envelope.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailParams>,
) -> Result<Response, ApiError> {
    let confirmed = match params.token {
        Some(token) if !token.is_empty() => state.store.confirm_email(&token).await?,
        _ => None,
    };
    Ok(match confirmed {
        Some(_) => (
            StatusCode::OK,
            "Email verified successfully! You can now log in.",
        )
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            "Invalid or expired verification link.",
        )
            .into_response(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub error: bool,
    pub message: String,
    pub email: String,
    pub access_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::validation("Invalid request body"))?;
    let email = required(body.email, "Email is required")?;
    let password = required(body.password, "Password is required")?;

    let user = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::validation("User not found"))?;

    // Verification is checked before the password.
    if !user.is_verified {
        return Err(ApiError::validation(
            "Please verify your email before logging in.",
        ));
    }

    let credentials_match = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&password, hash)?,
        None => false,
    };
    if !credentials_match {
        return Err(ApiError::validation("Invalid Credentials"));
    }

    let access_token = state.tokens.issue(user.id)?;
    Ok(Json(LoginResponse {
        error: false,
        message: "Login Successful".to_string(),
        email: user.email,
        access_token,
    }))
}

#[derive(Debug, Serialize)]
pub struct GetUserResponse {
    pub error: bool,
    pub user: UserProfile,
    pub message: String,
}

pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<GetUserResponse>, ApiError> {
    // A valid token for a user that no longer exists is still unauthorized.
    let user = state
        .store
        .find_by_id(auth.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(GetUserResponse {
        error: false,
        user: user.to_profile(),
        message: String::new(),
    }))
}

/// Reject absent or empty required fields with the field's message.
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::validation(message)),
    }
}

/// 32 random bytes, hex encoded: the opaque email verification token.
fn fresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_empty() {
        assert!(required(None, "Email is required").is_err());
        assert!(required(Some(String::new()), "Email is required").is_err());
        assert_eq!(
            required(Some("a@example.com".to_string()), "Email is required").unwrap(),
            "a@example.com"
        );
    }

    #[test]
    fn verification_tokens_are_long_and_unique() {
        let first = fresh_token();
        let second = fresh_token();
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
