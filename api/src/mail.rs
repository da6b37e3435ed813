//! Verification mail delivery seam.
//!
//! Registration triggers a verification email out of band. Delivery sits
//! behind the [`Mailer`] trait: [`HttpMailer`] posts to an HTTP mail API,
//! [`LogMailer`] only logs the link for development runs without one.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail endpoint rejected the message: {0}")]
    Rejected(reqwest::StatusCode),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the account verification link to `to`.
    async fn send_verification(
        &self,
        to: &str,
        full_name: &str,
        verify_url: &str,
    ) -> Result<(), MailError>;
}

/// Mailer posting JSON to an HTTP mail API with a bearer key.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, sender: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_verification(
        &self,
        to: &str,
        full_name: &str,
        verify_url: &str,
    ) -> Result<(), MailError> {
        let body = json!({
            "from": self.sender,
            "to": to,
            "subject": "Verify your email",
            "html": format!(
                "<p>Hi {full_name},</p>\
                 <p>Please verify your email by clicking the link below:</p>\
                 <a href=\"{verify_url}\">Verify Email</a>"
            ),
        });
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status()));
        }
        Ok(())
    }
}

/// Development mailer: logs the verification link instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(
        &self,
        to: &str,
        _full_name: &str,
        verify_url: &str,
    ) -> Result<(), MailError> {
        info!("verification link for {to}: {verify_url}");
        Ok(())
    }
}
