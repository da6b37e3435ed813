//! Note CRUD, pagination, and search handlers. Every operation is scoped
//! to the authenticated owner; someone else's note id reads as not found.

use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use store::{NewNote, Note, NotePatch, NoteStore};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::MessageResponse;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 18;

/// Tags arrive either pre-parsed or as a JSON-encoded array. Multipart
/// forms can only carry the encoded form; both decode to the same list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Encoded(String),
}

impl TagsField {
    /// Decode to the tag list, rejecting malformed JSON.
    pub fn decode(self) -> Result<Vec<String>, ApiError> {
        match self {
            TagsField::List(tags) => Ok(tags),
            TagsField::Encoded(raw) => serde_json::from_str(&raw)
                .map_err(|_| ApiError::validation("Tags must be a JSON array of strings")),
        }
    }
}

/// Fields collected from a multipart note form.
#[derive(Debug, Default)]
struct NoteForm {
    title: Option<String>,
    content: Option<String>,
    tags: Option<TagsField>,
    is_pinned: Option<bool>,
    image: Option<String>,
}

impl NoteForm {
    /// Drain the multipart stream into the known fields. Unknown fields
    /// are ignored; an attached image file is base64 encoded.
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::validation("Invalid form data"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = Some(text(field).await?),
                "content" => form.content = Some(text(field).await?),
                "tags" => form.tags = Some(TagsField::Encoded(text(field).await?)),
                "isPinned" => {
                    let raw = text(field).await?;
                    let parsed = raw
                        .parse::<bool>()
                        .map_err(|_| ApiError::validation("isPinned must be a boolean"))?;
                    form.is_pinned = Some(parsed);
                }
                "image" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::validation("Invalid form data"))?;
                    if !bytes.is_empty() {
                        form.image = Some(BASE64.encode(&bytes));
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::validation("Invalid form data"))
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub error: bool,
    pub note: Note,
    pub message: String,
}

pub async fn add_note(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::validation("Invalid form data"))?;
    let form = NoteForm::read(multipart).await?;

    let title = form
        .title
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ApiError::validation("Title is required"))?;
    let content = form
        .content
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ApiError::validation("Content is required"))?;
    let tags = match form.tags {
        Some(tags) => tags.decode()?,
        None => Vec::new(),
    };

    let note = state
        .store
        .insert_note(NewNote {
            owner_id: auth.user_id,
            title,
            content,
            tags,
            image: form.image,
        })
        .await?;

    Ok(Json(NoteResponse {
        error: false,
        note,
        message: "Note added successfully".to_string(),
    }))
}

pub async fn edit_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::validation("Invalid form data"))?;
    let form = NoteForm::read(multipart).await?;

    // Empty strings count as "not provided", same as absent fields.
    let patch = NotePatch {
        title: form.title.filter(|title| !title.is_empty()),
        content: form.content.filter(|content| !content.is_empty()),
        tags: match form.tags {
            Some(tags) => Some(tags.decode()?),
            None => None,
        },
        is_pinned: form.is_pinned,
        image: form.image,
    };
    if patch.is_empty() {
        return Err(ApiError::validation("No changes provided"));
    }

    let note = state
        .store
        .update_note(auth.user_id, parse_note_id(&note_id)?, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(Json(NoteResponse {
        error: false,
        note,
        message: "Note updated successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinnedRequest {
    pub is_pinned: bool,
}

pub async fn update_note_pinned(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    body: Result<Json<UpdatePinnedRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::validation("isPinned must be a boolean"))?;
    let note = state
        .store
        .set_pinned(auth.user_id, parse_note_id(&note_id)?, body.is_pinned)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(Json(NoteResponse {
        error: false,
        note,
        message: "Note pinned status updated successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesResponse {
    pub error: bool,
    pub notes: Vec<Note>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub message: String,
}

pub async fn get_all_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListNotesResponse>, ApiError> {
    let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE);
    let limit = parse_positive(params.limit.as_deref(), DEFAULT_LIMIT);
    let notes = state.store.list_notes(auth.user_id, page, limit).await?;
    Ok(Json(ListNotesResponse {
        error: false,
        notes: notes.notes,
        total: notes.total,
        page: notes.page,
        limit: notes.limit,
        total_pages: notes.total_pages,
        message: "All notes retrieved successfully".to_string(),
    }))
}

pub async fn delete_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .store
        .delete_note(auth.user_id, parse_note_id(&note_id)?)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Note not found"));
    }
    Ok(Json(MessageResponse::ok("Note deleted successfully")))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchNotesResponse {
    pub error: bool,
    pub notes: Vec<Note>,
    pub message: String,
}

pub async fn search_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchNotesResponse>, ApiError> {
    let query = params
        .query
        .filter(|query| !query.is_empty())
        .ok_or_else(|| ApiError::validation("Search query is required"))?;
    let notes = state.store.search_notes(auth.user_id, &query).await?;
    Ok(Json(SearchNotesResponse {
        error: false,
        notes,
        message: "Notes matching the search query retrieved successfully".to_string(),
    }))
}

/// A note id that does not parse cannot name any note.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Note not found"))
}

/// Absent, non-numeric, and non-positive values fall back to the default.
fn parse_positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_params_fall_back_to_defaults() {
        assert_eq!(parse_positive(None, 18), 18);
        assert_eq!(parse_positive(Some("2"), 18), 2);
        assert_eq!(parse_positive(Some("abc"), 18), 18);
        assert_eq!(parse_positive(Some("0"), 1), 1);
        assert_eq!(parse_positive(Some("-3"), 1), 1);
    }

    #[test]
    fn tags_decode_from_both_shapes() {
        let list = TagsField::List(vec!["a".to_string()]);
        assert_eq!(list.decode().unwrap(), vec!["a".to_string()]);

        let encoded = TagsField::Encoded(r#"["a","b"]"#.to_string());
        assert_eq!(
            encoded.decode().unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );

        assert!(TagsField::Encoded("not json".to_string()).decode().is_err());
        assert!(TagsField::Encoded(r#"{"a":1}"#.to_string()).decode().is_err());
    }

    #[test]
    fn tags_field_deserializes_untagged() {
        let list: TagsField = serde_json::from_str(r#"["a"]"#).unwrap();
        assert!(matches!(list, TagsField::List(_)));

        let encoded: TagsField = serde_json::from_str(r#""[\"a\"]""#).unwrap();
        assert!(matches!(encoded, TagsField::Encoded(_)));
    }

    #[test]
    fn unparseable_note_ids_read_as_not_found() {
        let err = parse_note_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(parse_note_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
