//! # cloudnotes-db
//!
//! PostgreSQL database layer for CloudNotes.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, notes and analytics
//! - Owner-scoped query composition for note listing and updates
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudnotes_db::{
//!     CreateNoteRequest, Database, NoteRepository, OwnerId, PoolConfig, UserRepository,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/cloudnotes", PoolConfig::default()).await?;
//!     db.migrate().await?;
//!
//!     let user = db.users.insert("alice@example.com", &password_hash).await?;
//!     let owner = OwnerId(user.id);
//!     let note = db.notes.insert(owner, CreateNoteRequest {
//!         title: "Groceries".to_string(),
//!         tags: vec!["home".to_string()],
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod notes;
pub mod pool;
pub mod query;
pub mod stats;
pub mod users;

// Always compiled so integration tests (in tests/) can use it.
pub mod test_fixtures;

// Re-export core types
pub use cloudnotes_core::*;

pub use notes::PgNoteRepository;
pub use pool::{connect_pool, log_pool_metrics, PoolConfig};
pub use query::{BuiltQuery, NoteFilter, NoteListQuery, NoteUpdateQuery, QueryParam};
pub use stats::PgStatsRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub users: PgUserRepository,
    pub notes: PgNoteRepository,
    pub stats: PgStatsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            stats: PgStatsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool against `url` and wire the repositories to it.
    pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
