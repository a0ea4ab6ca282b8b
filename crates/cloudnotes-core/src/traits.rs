//! Core traits for CloudNotes abstractions.
//!
//! These traits define the interfaces that concrete storage backends must
//! satisfy. The API layer only ever talks to these traits, which keeps the
//! HTTP surface testable against in-memory implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Persistence for user identities. Email uniqueness is enforced here.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with `Error::Conflict` if the email is taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User>;

    /// Look up a user and their stored hash by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Owner-scoped note persistence.
///
/// Every method takes the requesting owner. A row that exists under another
/// owner is reported exactly like a row that does not exist at all
/// (`Error::NotFound`).
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List notes matching all filters, pinned first then newest first.
    async fn list(&self, owner: OwnerId, req: ListNotesRequest) -> Result<Vec<Note>>;

    /// Fetch a single note.
    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Note>;

    /// Create a note (never archived on creation).
    async fn insert(&self, owner: OwnerId, req: CreateNoteRequest) -> Result<Note>;

    /// Partially update a note; absent optional fields keep their values.
    async fn update(&self, owner: OwnerId, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Permanently delete a note.
    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()>;

    /// Atomically negate `is_pinned` in place.
    async fn toggle_pin(&self, owner: OwnerId, id: Uuid) -> Result<Note>;

    /// Set `is_archived` to exactly `archived`.
    async fn set_archived(&self, owner: OwnerId, id: Uuid, archived: bool) -> Result<Note>;

    /// Distinct tags across the owner's non-archived notes, ascending.
    async fn tags_for_owner(&self, owner: OwnerId) -> Result<Vec<String>>;
}

// =============================================================================
// STATS REPOSITORY
// =============================================================================

/// Global, cross-owner counters.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn analytics(&self) -> Result<Analytics>;
}
