//! Note storage, all operations scoped by owner: a note id belonging to a
//! different user behaves exactly like a missing id.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewNote, Note, NotePage, NotePatch};

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persist a new note with `is_pinned = false`.
    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError>;

    /// Apply a partial update to the owner's note. `None` when the id does
    /// not exist or belongs to someone else.
    async fn update_note(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError>;

    /// Flip the pinned flag on the owner's note.
    async fn set_pinned(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        is_pinned: bool,
    ) -> Result<Option<Note>, StoreError> {
        self.update_note(owner_id, note_id, NotePatch::pinned(is_pinned))
            .await
    }

    /// Delete the owner's note. `false` when nothing was deleted.
    async fn delete_note(&self, owner_id: Uuid, note_id: Uuid) -> Result<bool, StoreError>;

    /// One page of the owner's notes: pinned first, then creation order.
    async fn list_notes(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<NotePage, StoreError>;

    /// Case-insensitive substring search over title and content.
    async fn search_notes(&self, owner_id: Uuid, query: &str) -> Result<Vec<Note>, StoreError>;
}
