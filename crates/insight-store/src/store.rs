use chrono::Utc;
use insight_core::{InsightError, ScoredInsight};

use crate::db::{db_error, InsightDb};
use crate::models::StoredInsight;

/// Upsert and lookup of scored insights keyed by company id.
#[derive(Clone)]
pub struct InsightStore {
    db: InsightDb,
}

impl InsightStore {
    pub fn new(db: InsightDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &InsightDb {
        &self.db
    }

    /// Insert the insight, or replace every field of the existing row for the
    /// same company. Metrics are zeroed if not finite.
    pub async fn save_analysis(&self, insight: &ScoredInsight) -> Result<(), InsightError> {
        let company_id = insight.company_id.trim();
        if company_id.is_empty() {
            return Err(InsightError::InvalidData(
                "cannot store an insight without a company id".to_string(),
            ));
        }

        let insight = insight.clone().sanitized();

        sqlx::query(
            r#"
            INSERT INTO ml (company_id, company_name, top_pros, top_cons, roe, sales_growth, profit_growth, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(company_id) DO UPDATE SET
                company_name = excluded.company_name,
                top_pros = excluded.top_pros,
                top_cons = excluded.top_cons,
                roe = excluded.roe,
                sales_growth = excluded.sales_growth,
                profit_growth = excluded.profit_growth,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(company_id)
        .bind(&insight.company_name)
        .bind(insight.pros_delimited())
        .bind(insight.cons_delimited())
        .bind(insight.roe)
        .bind(insight.sales_growth)
        .bind(insight.profit_growth)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            tracing::error!("Database error for {}: {}", company_id, e);
            db_error(e)
        })?;

        tracing::info!("Saved insight for {}", company_id);
        Ok(())
    }

    pub async fn get_analysis(&self, company_id: &str) -> Result<Option<StoredInsight>, InsightError> {
        sqlx::query_as::<_, StoredInsight>("SELECT * FROM ml WHERE company_id = ?")
            .bind(company_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(db_error)
    }

    pub async fn count(&self) -> Result<i64, InsightError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ml")
            .fetch_one(self.db.pool())
            .await
            .map_err(db_error)?;
        Ok(count)
    }
}
