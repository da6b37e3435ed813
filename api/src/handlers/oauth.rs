//! Google OAuth handshake routes.
//!
//! `/auth/google` sends the browser to Google's consent screen and parks
//! the PKCE verifier under the CSRF state; the callback exchanges the code
//! and resolves the account in the user directory, then redirects back to
//! the frontend with a freshly issued bearer token in the query string.
//! All failures redirect to the frontend login page with an error code.

use axum::extract::{Query, State};
use axum::response::Redirect;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::error;

use store::UserDirectory;

use crate::state::{AppState, PendingLogin};

/// Pending handshakes expire after ten minutes.
const PENDING_LOGIN_TTL_MINUTES: i64 = 10;

pub async fn google_auth(State(state): State<AppState>) -> Redirect {
    let Some(google) = &state.google else {
        error!("Google OAuth is not configured");
        return login_error(&state, "config_error");
    };

    let (url, csrf_state, pkce_verifier) = google.authorize_url();
    let now = Utc::now();
    let mut pending = state.pending_logins.write().await;
    pending.retain(|_, login| login.expires_at > now);
    pending.insert(
        csrf_state,
        PendingLogin {
            pkce_verifier,
            expires_at: now + Duration::minutes(PENDING_LOGIN_TTL_MINUTES),
        },
    );
    Redirect::to(&url)
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let Some(google) = &state.google else {
        error!("Google OAuth is not configured");
        return login_error(&state, "config_error");
    };
    let Some(code) = params.code else {
        error!("Google callback arrived without a code");
        return login_error(&state, "missing_code");
    };
    let Some(csrf_state) = params.state else {
        error!("Google callback arrived without a state");
        return login_error(&state, "missing_state");
    };

    let pending = state.pending_logins.write().await.remove(&csrf_state);
    let Some(pending) = pending.filter(|login| login.expires_at > Utc::now()) else {
        error!("Google callback with unknown or expired state");
        return login_error(&state, "invalid_state");
    };

    let profile = match google.exchange_code(&code, pending.pkce_verifier).await {
        Ok(profile) => profile,
        Err(err) => {
            error!("Google OAuth exchange failed: {err}");
            return login_error(&state, "oauth_error");
        }
    };

    let user = match state
        .store
        .find_or_create_google(profile.into_account())
        .await
    {
        Ok(user) => user,
        Err(err) => {
            error!("failed to resolve Google account: {err}");
            return login_error(&state, "oauth_error");
        }
    };

    match state.tokens.issue(user.id) {
        Ok(token) => Redirect::to(&format!("{}/login?token={token}", state.frontend_url)),
        Err(err) => {
            error!("failed to issue a token: {err}");
            login_error(&state, "oauth_error")
        }
    }
}

fn login_error(state: &AppState, code: &str) -> Redirect {
    Redirect::to(&format!("{}/login?error={code}", state.frontend_url))
}
