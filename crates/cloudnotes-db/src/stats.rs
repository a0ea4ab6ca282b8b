//! Global counters for the analytics endpoint.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use cloudnotes_core::{Analytics, Error, Result, StatsRepository};

/// PostgreSQL implementation of StatsRepository.
#[derive(Clone)]
pub struct PgStatsRepository {
    pool: Pool<Postgres>,
}

impl PgStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn analytics(&self) -> Result<Analytics> {
        sqlx::query_as::<_, Analytics>(
            r#"SELECT
                   (SELECT COUNT(*) FROM users) AS users,
                   COUNT(*) FILTER (WHERE NOT is_archived) AS notes,
                   COUNT(*) FILTER (WHERE is_archived) AS archived,
                   COUNT(*) FILTER (WHERE is_pinned) AS pinned,
                   COUNT(*) FILTER (WHERE cardinality(tags) > 0) AS tagged
               FROM notes"#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
