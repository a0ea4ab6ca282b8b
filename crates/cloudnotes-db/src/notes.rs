//! Note repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use cloudnotes_core::{
    CreateNoteRequest, Error, ListNotesRequest, Note, NoteRepository, OwnerId, Result,
    UpdateNoteRequest,
};

use crate::query::{bind_params, NoteListQuery, NoteUpdateQuery, NOTE_COLUMNS};

fn not_found() -> Error {
    Error::NotFound("Note not found".to_string())
}

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, owner: OwnerId, req: ListNotesRequest) -> Result<Vec<Note>> {
        let start = Instant::now();
        let req = req.validated()?;
        let query = NoteListQuery::from_request(owner, &req).build();

        let notes = bind_params(sqlx::query_as::<_, Note>(&query.sql), &query.params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "list",
            user_id = %owner,
            archived = req.archived,
            pinned = req.pinned,
            has_tag = req.tag.is_some(),
            has_search = req.search.is_some(),
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes"
        );
        Ok(notes)
    }

    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Note> {
        let sql = format!(
            "SELECT {} FROM notes WHERE id = $1 AND user_id = $2",
            NOTE_COLUMNS
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(not_found)
    }

    async fn insert(&self, owner: OwnerId, req: CreateNoteRequest) -> Result<Note> {
        let start = Instant::now();
        let req = req.validated()?;
        let id = Uuid::now_v7();
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO notes (id, user_id, title, content, file_url, tags, is_pinned, is_archived, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $8) \
             RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner.as_uuid())
            .bind(&req.title)
            .bind(&req.content)
            .bind(&req.file_url)
            .bind(&req.tags)
            .bind(req.is_pinned)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "insert",
            user_id = %owner,
            note_id = %note.id,
            tag_count = note.tags.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Note created"
        );
        Ok(note)
    }

    async fn update(&self, owner: OwnerId, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let req = req.validated()?;
        let query = NoteUpdateQuery::from_request(owner, id, req, Utc::now()).build();

        let note = bind_params(sqlx::query_as::<_, Note>(&query.sql), &query.params)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(not_found)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "update",
            user_id = %owner,
            note_id = %id,
            "Note updated"
        );
        Ok(note)
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        debug!(
            subsystem = "database",
            component = "notes",
            op = "delete",
            user_id = %owner,
            note_id = %id,
            "Note deleted"
        );
        Ok(())
    }

    async fn toggle_pin(&self, owner: OwnerId, id: Uuid) -> Result<Note> {
        // Negated in SQL so concurrent toggles serialize on the row lock.
        let sql = format!(
            "UPDATE notes SET is_pinned = NOT is_pinned, updated_at = $3 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner.as_uuid())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(not_found)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "toggle_pin",
            user_id = %owner,
            note_id = %id,
            is_pinned = note.is_pinned,
            "Note pin toggled"
        );
        Ok(note)
    }

    async fn set_archived(&self, owner: OwnerId, id: Uuid, archived: bool) -> Result<Note> {
        let sql = format!(
            "UPDATE notes SET is_archived = $3, updated_at = $4 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner.as_uuid())
            .bind(archived)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(not_found)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "set_archived",
            user_id = %owner,
            note_id = %id,
            is_archived = archived,
            "Note archive state set"
        );
        Ok(note)
    }

    async fn tags_for_owner(&self, owner: OwnerId) -> Result<Vec<String>> {
        // Byte-order collation keeps the ordering independent of the
        // database locale.
        let tags = sqlx::query_scalar::<_, String>(
            r#"SELECT DISTINCT t.tag COLLATE "C" AS tag
               FROM notes n, unnest(n.tags) AS t(tag)
               WHERE n.user_id = $1 AND n.is_archived = FALSE
               ORDER BY tag"#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(tags)
    }
}
