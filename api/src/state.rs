//! Shared application state injected into every handler.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use store::Store;

use crate::auth::{GoogleOAuth, TokenKeys};
use crate::mail::Mailer;

/// A started OAuth handshake: the PKCE verifier waiting for the provider
/// callback, keyed by CSRF state.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub pkce_verifier: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenKeys,
    pub mailer: Arc<dyn Mailer>,
    /// Configured Google client, `None` when OAuth is not set up.
    pub google: Option<GoogleOAuth>,
    pub pending_logins: Arc<RwLock<HashMap<String, PendingLogin>>>,
    /// Public base URL of this service, used in verification links.
    pub public_url: String,
    /// Frontend base URL, used for OAuth redirects.
    pub frontend_url: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenKeys,
        mailer: Arc<dyn Mailer>,
        google: Option<GoogleOAuth>,
        public_url: String,
        frontend_url: String,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            google,
            pending_logins: Arc::new(RwLock::new(HashMap::new())),
            public_url,
            frontend_url,
        }
    }
}
