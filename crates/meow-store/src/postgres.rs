use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::store::{MeowStore, to_sql_bound};
use crate::{Meow, MeowId, Result};

/// PostgreSQL-backed system of record.
#[derive(Clone)]
pub struct PostgresMeowStore {
    pool: PgPool,
}

impl PostgresMeowStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts a record unless one with the same ID exists.
    ///
    /// The command side owns writes; this exists for seeding and tests.
    pub async fn insert(&self, meow: &Meow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meows (id, body, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(meow.id.as_str())
        .bind(&meow.body)
        .bind(meow.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_meow(row: PgRow) -> Result<Meow> {
        Ok(Meow {
            id: MeowId::new(row.try_get::<String, _>("id")?),
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl MeowStore for PostgresMeowStore {
    #[tracing::instrument(skip(self))]
    async fn list_by_created_at(&self, offset: u64, limit: u64) -> Result<Vec<Meow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, body, created_at
            FROM meows
            ORDER BY created_at ASC, id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(to_sql_bound(offset))
        .bind(to_sql_bound(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_meow).collect()
    }
}
