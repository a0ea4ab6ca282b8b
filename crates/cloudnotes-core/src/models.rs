//! Domain models for users and notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// A user row together with its stored password hash.
///
/// Only the credential store sees this type; it is not serializable so it
/// cannot leak through an HTTP response by accident.
#[derive(Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserCredentials {
    /// Drop the hash, keeping the outward identity.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Identity every note operation is scoped to.
///
/// Only the access gate produces one (from a verified session), so a
/// repository call cannot be made without an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        OwnerId(id)
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a new note.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
}

impl CreateNoteRequest {
    /// Reject an empty title and normalize the tag list.
    pub fn validated(mut self) -> Result<Self> {
        validate_title(&self.title)?;
        reject_nul("content", self.content.as_deref())?;
        reject_nul("file_url", self.file_url.as_deref())?;
        self.tags = normalize_tags(self.tags);
        reject_nul_tags(&self.tags)?;
        Ok(self)
    }
}

/// Request for a partial update. `None` fields keep their stored value;
/// `title` is always rewritten.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
}

impl UpdateNoteRequest {
    /// Reject an empty title and normalize the tag list if one was given.
    pub fn validated(mut self) -> Result<Self> {
        validate_title(&self.title)?;
        reject_nul("content", self.content.as_deref())?;
        self.tags = self.tags.map(normalize_tags);
        if let Some(tags) = &self.tags {
            reject_nul_tags(tags)?;
        }
        Ok(self)
    }
}

/// Filters for listing an owner's notes. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListNotesRequest {
    /// Select archived notes instead of active ones.
    pub archived: bool,
    /// Restrict to pinned notes when true; no pin restriction otherwise.
    pub pinned: bool,
    /// Restrict to notes whose tag set contains this exact string.
    pub tag: Option<String>,
    /// Natural-language full-text query over title and content.
    pub search: Option<String>,
    /// Maximum results (1..=MAX_LIST_LIMIT)
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Upper bound accepted for `ListNotesRequest::limit`.
pub const MAX_LIST_LIMIT: i64 = 100;

impl ListNotesRequest {
    /// Treat blank `tag`/`search` as absent and bounds-check pagination.
    pub fn validated(mut self) -> Result<Self> {
        self.tag = non_blank(self.tag);
        self.search = non_blank(self.search);
        reject_nul("tag", self.tag.as_deref())?;
        reject_nul("search", self.search.as_deref())?;

        if let Some(limit) = self.limit {
            if !(1..=MAX_LIST_LIMIT).contains(&limit) {
                return Err(Error::InvalidInput(format!(
                    "limit must be between 1 and {}",
                    MAX_LIST_LIMIT
                )));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(Error::InvalidInput("offset must be >= 0".to_string()));
            }
        }
        Ok(self)
    }
}

/// Global counters exposed by the admin analytics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Analytics {
    pub users: i64,
    /// Non-archived notes.
    pub notes: i64,
    pub archived: i64,
    pub pinned: i64,
    /// Notes with at least one tag.
    pub tagged: i64,
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// A title must contain at least one non-whitespace character.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    reject_nul("title", Some(title))
}

/// PostgreSQL text cannot hold U+0000.
pub fn reject_nul(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if v.contains('\0') => Err(Error::InvalidInput(format!(
            "{} must not contain NUL characters",
            field
        ))),
        _ => Ok(()),
    }
}

fn reject_nul_tags(tags: &[String]) -> Result<()> {
    tags.iter()
        .try_for_each(|tag| reject_nul("tags", Some(tag.as_str())))
}

/// Trim tags, drop empty ones, and collapse duplicates keeping first occurrence.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || result.iter().any(|t| t == tag) {
            continue;
        }
        result.push(tag.to_string());
    }
    result
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
