//! Domain models shared by the storage backends and the HTTP layer.
//!
//! [`User`] is the full directory record including credential material and
//! is never serialized to clients; [`UserProfile`] is the projection that
//! is. [`Note`] serializes with camelCase field names to match the wire
//! contract (`isPinned`, `createdOn`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user record as stored in the directory.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub created_on: DateTime<Utc>,
}

impl User {
    /// Projection safe to send to the client. Credential material and the
    /// verification token stay behind.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            google_id: self.google_id.clone(),
            is_verified: self.is_verified,
            created_on: self.created_on,
        }
    }
}

/// Client-facing user information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub created_on: DateTime<Utc>,
}

/// Payload for inserting a new user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
}

/// Account data resolved from the Google userinfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleAccount {
    pub google_id: String,
    pub email: String,
    pub full_name: String,
}

/// A note owned by a single user. `image` is a base64-encoded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub is_pinned: bool,
    pub created_on: DateTime<Utc>,
}

/// Payload for creating a note. Pinned state always starts false.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

/// Partial update applied to an existing note. `None` fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub image: Option<String>,
}

impl NotePatch {
    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.is_pinned.is_none()
            && self.image.is_none()
    }

    /// Patch that only flips the pinned flag.
    pub fn pinned(is_pinned: bool) -> Self {
        Self {
            is_pinned: Some(is_pinned),
            ..Self::default()
        }
    }
}

/// One page of a user's notes, pinned entries first.
#[derive(Debug, Clone)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl NotePage {
    /// Assemble a page, deriving `total_pages = ceil(total / limit)`.
    pub fn new(notes: Vec<Note>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };
        Self {
            notes,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
