use insight_core::InsightError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Clone)]
pub struct InsightDb {
    pool: SqlitePool,
}

impl InsightDb {
    /// Open (creating if missing) the database and apply the schema.
    pub async fn new(database_url: &str) -> Result<Self, InsightError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_error)?
            .create_if_missing(true);

        // Every connection to an in-memory database is a separate database
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(db_error)?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::debug!("Opened insight database at {}", database_url);
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), InsightError> {
        let schema = include_str!("../../../schema.sql");

        // sqlx executes one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_error)?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub(crate) fn db_error(e: sqlx::Error) -> InsightError {
    InsightError::DatabaseError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_db_creation() {
        let db = InsightDb::new("sqlite::memory:").await.unwrap();
        assert!(db.pool().acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_schema_is_reapplied_safely() {
        let db = InsightDb::new("sqlite::memory:").await.unwrap();
        db.init_schema().await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ml")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unopenable_path_is_database_error() {
        let err = InsightDb::new("sqlite:/nonexistent-dir/nested/insights.db").await.err().unwrap();
        assert!(matches!(err, InsightError::DatabaseError(_)));
    }
}
