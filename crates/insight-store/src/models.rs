use insight_core::split_insights;
use serde::{Deserialize, Serialize};

/// A row of the `ml` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredInsight {
    pub id: i64,
    pub company_id: String,
    pub company_name: Option<String>,
    /// Pipe-delimited, e.g. `"Pro 1|Pro 2|Pro 3"`
    pub top_pros: Option<String>,
    /// Pipe-delimited, e.g. `"Con 1|Con 2"`
    pub top_cons: Option<String>,
    pub roe: Option<f64>,
    pub sales_growth: Option<f64>,
    pub profit_growth: Option<f64>,
    /// RFC 3339, UTC
    pub updated_at: Option<String>,
}

impl StoredInsight {
    pub fn pros(&self) -> Vec<String> {
        self.top_pros.as_deref().map(split_insights).unwrap_or_default()
    }

    pub fn cons(&self) -> Vec<String> {
        self.top_cons.as_deref().map(split_insights).unwrap_or_default()
    }
}
