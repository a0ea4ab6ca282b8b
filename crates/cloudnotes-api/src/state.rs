//! Shared handler state.

use std::sync::Arc;

use cloudnotes_auth::{CredentialStore, SessionIssuer};
use cloudnotes_core::{NoteRepository, StatsRepository, UserRepository};
use cloudnotes_db::Database;

/// Storage handles and the session issuer, injected into every handler.
///
/// Repositories are trait objects so the router can run over any backend.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub sessions: Arc<SessionIssuer>,
    pub notes: Arc<dyn NoteRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notes: Arc<dyn NoteRepository>,
        stats: Arc<dyn StatsRepository>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(users),
            sessions: Arc::new(sessions),
            notes,
            stats,
        }
    }

    /// Wire the PostgreSQL repositories from an open database.
    pub fn from_database(db: &Database, sessions: SessionIssuer) -> Self {
        Self::new(
            Arc::new(db.users.clone()),
            Arc::new(db.notes.clone()),
            Arc::new(db.stats.clone()),
            sessions,
        )
    }
}
