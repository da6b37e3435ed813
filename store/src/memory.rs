use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::error::StoreError;
use crate::models::{GoogleAccount, NewNote, NewUser, Note, NotePage, NotePatch, User};
use crate::notes::NoteStore;

/// In-memory store for tests and database-less development runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    notes: Vec<Note>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            google_id: user.google_id,
            is_verified: user.is_verified,
            verification_token: user.verification_token,
            created_on: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn confirm_email(&self, token: &str) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.verification_token.as_deref() == Some(token));
        Ok(user.map(|u| {
            u.is_verified = true;
            u.verification_token = None;
            u.clone()
        }))
    }

    async fn find_or_create_google(&self, account: GoogleAccount) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner
            .users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(&account.google_id))
        {
            return Ok(user.clone());
        }
        if let Some(user) = inner.users.iter_mut().find(|u| u.email == account.email) {
            user.google_id = Some(account.google_id);
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name: account.full_name,
            email: account.email,
            password_hash: None,
            google_id: Some(account.google_id),
            is_verified: true,
            verification_token: None,
            created_on: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id: note.owner_id,
            title: note.title,
            content: note.content,
            tags: note.tags,
            image: note.image,
            is_pinned: false,
            created_on: Utc::now(),
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(note) = inner
            .notes
            .iter_mut()
            .find(|n| n.id == note_id && n.owner_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(tags) = patch.tags {
            note.tags = tags;
        }
        if let Some(is_pinned) = patch.is_pinned {
            note.is_pinned = is_pinned;
        }
        if let Some(image) = patch.image {
            note.image = Some(image);
        }
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, owner_id: Uuid, note_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.notes.len();
        inner
            .notes
            .retain(|n| !(n.id == note_id && n.owner_id == owner_id));
        Ok(inner.notes.len() < before)
    }

    async fn list_notes(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<NotePage, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut owned: Vec<Note> = inner
            .notes
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        // Stable sort keeps creation order within each pinned group.
        owned.sort_by_key(|n| !n.is_pinned);
        let total = owned.len() as u64;
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let notes = owned.into_iter().skip(offset).take(limit as usize).collect();
        Ok(NotePage::new(notes, total, page, limit))
    }

    async fn search_notes(&self, owner_id: Uuid, query: &str) -> Result<Vec<Note>, StoreError> {
        let needle = query.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .notes
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .filter(|n| {
                n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
            google_id: None,
            is_verified: false,
            verification_token: Some(format!("token-{email}")),
        }
    }

    fn new_note(owner_id: Uuid, title: &str, content: &str) -> NewNote {
        NewNote {
            owner_id,
            title: title.to_string(),
            content: content.to_string(),
            tags: vec!["tag".to_string()],
            image: None,
        }
    }

    #[tokio::test]
    async fn insert_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@example.com")).await.unwrap();
        let err = store.insert_user(new_user("a@example.com")).await;
        assert!(matches!(err, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn confirm_email_is_single_use() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("a@example.com")).await.unwrap();
        assert!(!user.is_verified);

        let confirmed = store
            .confirm_email("token-a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.is_verified);
        assert!(confirmed.verification_token.is_none());

        // The token is gone after the first use.
        assert!(store
            .confirm_email("token-a@example.com")
            .await
            .unwrap()
            .is_none());
        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.is_verified);
    }

    #[tokio::test]
    async fn confirm_email_with_unknown_token_is_none() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@example.com")).await.unwrap();
        assert!(store.confirm_email("bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn google_login_creates_once_then_finds() {
        let store = MemoryStore::new();
        let account = GoogleAccount {
            google_id: "g-1".to_string(),
            email: "g@example.com".to_string(),
            full_name: "G User".to_string(),
        };
        let first = store.find_or_create_google(account.clone()).await.unwrap();
        assert!(first.is_verified);
        let second = store.find_or_create_google(account).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn google_login_links_account_with_same_email() {
        let store = MemoryStore::new();
        let existing = store.insert_user(new_user("a@example.com")).await.unwrap();
        let linked = store
            .find_or_create_google(GoogleAccount {
                google_id: "g-1".to_string(),
                email: "a@example.com".to_string(),
                full_name: "A".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(linked.id, existing.id);
        assert_eq!(linked.google_id.as_deref(), Some("g-1"));
    }

    #[tokio::test]
    async fn insert_note_starts_unpinned() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let note = store.insert_note(new_note(owner, "T", "C")).await.unwrap();
        assert!(!note.is_pinned);
        assert_eq!(note.owner_id, owner);
    }

    #[tokio::test]
    async fn update_note_patches_only_given_fields() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let note = store
            .insert_note(new_note(owner, "Title", "Content"))
            .await
            .unwrap();

        let patch = NotePatch {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_note(owner, note.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.content, "Content");
        assert_eq!(updated.tags, vec!["tag".to_string()]);
    }

    #[tokio::test]
    async fn pin_patch_leaves_body_untouched() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let note = store
            .insert_note(new_note(owner, "Title", "Content"))
            .await
            .unwrap();

        let pinned = store
            .set_pinned(owner, note.id, true)
            .await
            .unwrap()
            .unwrap();
        assert!(pinned.is_pinned);
        assert_eq!(pinned.title, "Title");
        assert_eq!(pinned.content, "Content");
    }

    #[tokio::test]
    async fn update_is_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let note = store.insert_note(new_note(owner, "T", "C")).await.unwrap();

        let result = store
            .update_note(stranger, note.id, NotePatch::pinned(true))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(!store.delete_note(stranger, note.id).await.unwrap());
        // The note is still there for its owner.
        assert!(store.delete_note(owner, note.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_puts_pinned_first_in_creation_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut ids = Vec::new();
        for i in 0..5 {
            let note = store
                .insert_note(new_note(owner, &format!("note {i}"), "c"))
                .await
                .unwrap();
            ids.push(note.id);
        }
        store.set_pinned(owner, ids[3], true).await.unwrap();

        let page = store.list_notes(owner, 1, 18).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
        let listed: Vec<Uuid> = page.notes.iter().map(|n| n.id).collect();
        assert_eq!(listed, vec![ids[3], ids[0], ids[1], ids[2], ids[4]]);
    }

    #[tokio::test]
    async fn list_paginates() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for i in 0..5 {
            store
                .insert_note(new_note(owner, &format!("note {i}"), "c"))
                .await
                .unwrap();
        }

        let first = store.list_notes(owner, 1, 2).await.unwrap();
        assert_eq!(first.notes.len(), 2);
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages, 3);

        let last = store.list_notes(owner, 3, 2).await.unwrap();
        assert_eq!(last.notes.len(), 1);

        let beyond = store.list_notes(owner, 4, 2).await.unwrap();
        assert!(beyond.notes.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn list_only_returns_own_notes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.insert_note(new_note(owner, "mine", "c")).await.unwrap();
        store.insert_note(new_note(other, "theirs", "c")).await.unwrap();

        let page = store.list_notes(owner, 1, 18).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.notes[0].title, "mine");
    }

    #[tokio::test]
    async fn search_matches_title_and_content_case_insensitively() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store
            .insert_note(new_note(owner, "Groceries", "Buy milk"))
            .await
            .unwrap();
        store
            .insert_note(new_note(owner, "Workout", "Leg day"))
            .await
            .unwrap();

        let by_title = store.search_notes(owner, "gRoC").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Groceries");

        let by_content = store.search_notes(owner, "MILK").await.unwrap();
        assert_eq!(by_content.len(), 1);

        assert!(store.search_notes(owner, "tennis").await.unwrap().is_empty());
        assert!(store
            .search_notes(Uuid::new_v4(), "milk")
            .await
            .unwrap()
            .is_empty());
    }
}
