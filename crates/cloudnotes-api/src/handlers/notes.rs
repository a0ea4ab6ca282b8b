//! Note routes. Every handler runs behind the access gate and is scoped to
//! the resolved [`Owner`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use cloudnotes_core::{CreateNoteRequest, ListNotesRequest, Note, UpdateNoteRequest};

use crate::error::ApiError;
use crate::gate::Owner;
use crate::state::AppState;

/// Query string of `GET /notes`.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub archived: Option<bool>,
    pub pinned: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListNotesQuery> for ListNotesRequest {
    fn from(q: ListNotesQuery) -> Self {
        ListNotesRequest {
            archived: q.archived.unwrap_or(false),
            pinned: q.pinned.unwrap_or(false),
            tag: q.tag,
            search: q.search,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
}

impl From<CreateNoteBody> for CreateNoteRequest {
    fn from(body: CreateNoteBody) -> Self {
        CreateNoteRequest {
            title: body.title.unwrap_or_default(),
            content: body.content,
            file_url: body.file_url,
            tags: body.tags.unwrap_or_default(),
            is_pinned: body.is_pinned.unwrap_or(false),
        }
    }
}

/// `null` and absent are treated alike: the stored value is kept.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
}

impl From<UpdateNoteBody> for UpdateNoteRequest {
    fn from(body: UpdateNoteBody) -> Self {
        UpdateNoteRequest {
            title: body.title.unwrap_or_default(),
            content: body.content,
            tags: body.tags,
            is_pinned: body.is_pinned,
        }
    }
}

/// An id that is not a UUID cannot name any note.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Note not found".to_string()))
}

/// `GET /notes`
pub async fn list_notes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(query) = query?;
    let notes = state.notes.list(owner, query.into()).await?;
    Ok(Json(notes))
}

/// `POST /notes`
pub async fn create_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Result<Json<CreateNoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(body) = body?;
    let note = state.notes.insert(owner, body.into()).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /notes/:id`
pub async fn get_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes.fetch(owner, id).await?))
}

/// `PUT /notes/:id`
pub async fn update_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteBody>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(body) = body?;
    Ok(Json(state.notes.update(owner, id, body.into()).await?))
}

/// `DELETE /notes/:id`
pub async fn delete_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_note_id(&id)?;
    state.notes.delete(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /notes/:id/pin`
pub async fn toggle_pin(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes.toggle_pin(owner, id).await?))
}

/// `PATCH /notes/:id/archive`
pub async fn archive_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes.set_archived(owner, id, true).await?))
}

/// `PATCH /notes/:id/unarchive`
pub async fn unarchive_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes.set_archived(owner, id, false).await?))
}

/// `GET /notes/tags/all`
pub async fn list_tags(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.notes.tags_for_owner(owner).await?))
}
