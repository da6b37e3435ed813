//! Google OAuth 2.0 login.
//!
//! Authorization Code flow with PKCE. `authorize_url` starts a handshake
//! and hands back the CSRF state and PKCE verifier for the caller to hold
//! until the provider redirects back; `exchange_code` turns the callback
//! code into an access token and fetches the user's profile from the
//! userinfo endpoint. Account resolution itself lives in the user
//! directory, not here.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::Deserialize;

use store::GoogleAccount;

/// Profile fields read from the Google userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl GoogleProfile {
    /// Resolve to the directory's account shape, falling back to the email
    /// when Google does not supply a display name.
    pub fn into_account(self) -> GoogleAccount {
        let full_name = self.name.unwrap_or_else(|| self.email.clone());
        GoogleAccount {
            google_id: self.id,
            email: self.email,
            full_name,
        }
    }
}

/// OAuth client configuration, endpoints fixed to Google's.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl OAuthConfig {
    pub fn google(
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Result<Self, String> {
        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())
                .map_err(|e| e.to_string())?,
            token_url: TokenUrl::new("https://oauth2.googleapis.com/token".to_string())
                .map_err(|e| e.to_string())?,
            redirect_url: RedirectUrl::new(redirect_url).map_err(|e| e.to_string())?,
        })
    }
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler.
#[derive(Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
}

impl GoogleOAuth {
    pub fn new(config: OAuthConfig) -> Self {
        Self { config }
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }

    /// Build the authorization URL. Returns (url, CSRF state, PKCE
    /// verifier); the caller must remember state -> verifier until the
    /// callback arrives.
    pub fn authorize_url(&self) -> (String, String, String) {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();
        (
            auth_url.to_string(),
            csrf_state.secret().clone(),
            pkce_verifier.secret().clone(),
        )
    }

    /// Exchange the authorization code for an access token and fetch the
    /// user's profile.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: String,
    ) -> Result<GoogleProfile, String> {
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| e.to_string())?;

        let token_result = self
            .create_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| format!("Token exchange failed: {e}"))?;

        let access_token = token_result.access_token().secret();

        let profile: GoogleProfile = Client::new()
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| format!("Userinfo request failed: {e}"))?
            .json()
            .await
            .map_err(|e| format!("Userinfo response was not valid JSON: {e}"))?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_falls_back_to_email_for_missing_name() {
        let profile = GoogleProfile {
            id: "g-1".to_string(),
            email: "a@example.com".to_string(),
            name: None,
        };
        let account = profile.into_account();
        assert_eq!(account.google_id, "g-1");
        assert_eq!(account.full_name, "a@example.com");
    }

    #[test]
    fn authorize_url_carries_state_and_pkce() {
        let config = OAuthConfig::google(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/auth/google/callback".to_string(),
        )
        .unwrap();
        let google = GoogleOAuth::new(config);
        let (url, state, verifier) = google.authorize_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(url.contains(&format!("state={state}")));
        assert!(url.contains("code_challenge="));
        assert!(!verifier.is_empty());
    }
}
