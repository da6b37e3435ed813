//! User directory: account records, verification state, and Google account
//! resolution.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{GoogleAccount, NewUser, User};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a new user record. Fails with [`StoreError::DuplicateEmail`]
    /// when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Look up a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Mark the user holding this verification token as verified and clear
    /// the token. `None` when no user holds the token, which also makes
    /// confirmation single-use.
    async fn confirm_email(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Resolve a Google account to a user, creating one on first login, or
    /// attaching the Google id to an existing account registered under the
    /// same email. Accounts from this path are implicitly verified.
    async fn find_or_create_google(&self, account: GoogleAccount) -> Result<User, StoreError>;
}
