use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use grocery_core::{ReadSpec, Record, Result, Table, TabularSink, TabularSource, validate_record};

mod queries;

pub use queries::map_db_error;

/// Warehouse backed by a PostgreSQL database holding the star schema.
///
/// The tables are expected to exist already (see `sql/schema.sql`).
#[derive(Debug, Clone)]
pub struct PostgresWarehouse {
    pool: PgPool,
}

impl PostgresWarehouse {
    /// Create a new warehouse using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the default pool settings.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(map_db_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TabularSink for PostgresWarehouse {
    async fn append(&self, table: Table, records: &[Record]) -> Result<Vec<i64>> {
        for record in records {
            validate_record(table, record)?;
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut keys = Vec::with_capacity(records.len());
        for chunk in records.chunks(queries::rows_per_statement(table)) {
            keys.extend(queries::insert_batch(&mut tx, table, chunk).await?);
        }
        tx.commit().await.map_err(map_db_error)?;

        debug!(table = %table, rows = keys.len(), "batch appended");
        Ok(keys)
    }
}

#[async_trait]
impl TabularSource for PostgresWarehouse {
    async fn query(&self, spec: &ReadSpec) -> Result<Vec<Record>> {
        let rows = queries::fetch(&self.pool, spec).await?;
        debug!(table = %spec.table(), rows = rows.len(), "query served");
        Ok(rows)
    }
}
