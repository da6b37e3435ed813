//! Request handlers, grouped by resource.

mod accounts;
mod notes;
mod oauth;

pub use accounts::{create_account, get_user, login, verify_email};
pub use notes::{add_note, delete_note, edit_note, get_all_notes, search_notes, update_note_pinned};
pub use oauth::{google_auth, google_callback};

use serde::Serialize;

/// The bare `{error, message}` envelope used by message-only responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub error: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
        }
    }

    fn flagged(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}
