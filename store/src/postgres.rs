//! PostgreSQL backend: plain `sqlx` queries with binds, schema managed by
//! the embedded migrations under `migrations/`.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::error::StoreError;
use crate::models::{GoogleAccount, NewNote, NewUser, Note, NotePage, NotePatch, User};
use crate::notes::NoteStore;

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to the given database URL.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, full_name, email, password_hash, google_id, is_verified, verification_token)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.google_id)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn confirm_email(&self, token: &str) -> Result<Option<User>, StoreError> {
        // Single statement, so a token can only ever be consumed once.
        Ok(sqlx::query_as::<_, User>(
            "UPDATE users SET is_verified = TRUE, verification_token = NULL
             WHERE verification_token = $1
             RETURNING *",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_or_create_google(&self, account: GoogleAccount) -> Result<User, StoreError> {
        if let Some(user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = $1")
            .bind(&account.google_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(user);
        }
        // First Google login: create the account, or attach the Google id
        // to an existing account registered under the same email.
        Ok(sqlx::query_as::<_, User>(
            "INSERT INTO users (id, full_name, email, google_id, is_verified)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (email) DO UPDATE SET google_id = EXCLUDED.google_id
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.google_id)
        .fetch_one(&self.pool)
        .await?)
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        Ok(sqlx::query_as::<_, Note>(
            "INSERT INTO notes (id, owner_id, title, content, tags, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.tags)
        .bind(&note.image)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_note(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError> {
        Ok(sqlx::query_as::<_, Note>(
            "UPDATE notes SET
                 title = COALESCE($3, title),
                 content = COALESCE($4, content),
                 tags = COALESCE($5, tags),
                 is_pinned = COALESCE($6, is_pinned),
                 image = COALESCE($7, image)
             WHERE owner_id = $1 AND id = $2
             RETURNING *",
        )
        .bind(owner_id)
        .bind(note_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.tags)
        .bind(patch.is_pinned)
        .bind(&patch.image)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_note(&self, owner_id: Uuid, note_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(note_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_notes(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<NotePage, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE owner_id = $1
             ORDER BY is_pinned DESC, created_on ASC, id ASC
             OFFSET $2 LIMIT $3",
        )
        .bind(owner_id)
        .bind(offset)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(NotePage::new(notes, total as u64, page, limit))
    }

    async fn search_notes(&self, owner_id: Uuid, query: &str) -> Result<Vec<Note>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        Ok(sqlx::query_as::<_, Note>(
            "SELECT * FROM notes
             WHERE owner_id = $1 AND (title ILIKE $2 OR content ILIKE $2)
             ORDER BY created_on ASC, id ASC",
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Escape LIKE wildcards so the query text matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("abc"), "abc");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
