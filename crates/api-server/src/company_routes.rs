//! Company API Routes
//!
//! Live upstream company data with the stored insight merged in.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use insight_store::StoredInsight;
use serde_json::{json, Map, Value};

use crate::{AppError, AppState};

pub fn company_routes() -> Router<AppState> {
    Router::new().route("/api/company/:company_id", get(get_company_analysis))
}

/// Company data from the upstream API, with stored pros, cons and growth metrics
#[utoipa::path(
    get,
    path = "/api/company/{company_id}",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses(
        (status = 200, description = "Upstream payload with insight fields merged in"),
        (status = 502, description = "Upstream API failed"),
        (status = 500, description = "Internal error")
    ),
    tag = "Company"
)]
pub async fn get_company_analysis(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mut payload = state.client.fetch_live(&company_id).await?;

    match state.store.get_analysis(&company_id).await {
        Ok(Some(insight)) => {
            if merge_insight(&mut payload, &insight) {
                tracing::debug!("Merged stored insight into {}", company_id);
            }
        }
        Ok(None) => {}
        Err(e) => tracing::error!("Database fetch error for {}: {}", company_id, e),
    }

    Ok(Json(payload))
}

/// Merge a stored insight into an upstream payload.
///
/// Only applies when the payload has a non-empty `data` object: its
/// `prosandcons` becomes `[{"pros": ..}, .., {"cons": ..}, ..]` and the
/// `company` object gains `ml_sales_growth`, `ml_profit_growth` and `ml_roe`.
/// Returns whether anything was merged.
pub fn merge_insight(payload: &mut Value, insight: &StoredInsight) -> bool {
    let Some(root) = payload.as_object_mut() else {
        return false;
    };

    match root.get_mut("data").and_then(Value::as_object_mut) {
        Some(data) if !data.is_empty() => {
            let entries: Vec<Value> = insight
                .pros()
                .into_iter()
                .map(|p| json!({ "pros": p }))
                .chain(insight.cons().into_iter().map(|c| json!({ "cons": c })))
                .collect();
            data.insert("prosandcons".to_string(), Value::Array(entries));
        }
        _ => return false,
    }

    let company = root
        .entry("company")
        .or_insert_with(|| Value::Object(Map::new()));
    if !company.is_object() {
        *company = Value::Object(Map::new());
    }
    if let Some(company) = company.as_object_mut() {
        company.insert("ml_sales_growth".to_string(), json!(insight.sales_growth));
        company.insert("ml_profit_growth".to_string(), json!(insight.profit_growth));
        company.insert("ml_roe".to_string(), json!(insight.roe));
    }

    true
}
