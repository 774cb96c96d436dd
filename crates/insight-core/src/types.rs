use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{finite_or_zero, to_series_value, to_text};
use crate::delimited::join_insights;
use crate::InsightError;

/// Name stored when the upstream payload carries no `company_name`.
pub const UNKNOWN_COMPANY_NAME: &str = "Unknown";

/// Raw company payload as served by the company data API:
/// `{"company": {...}, "data": {"profitandloss": [...], "balancesheet": [...]}}`.
///
/// Either section may be missing or null; both deserialize to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFinancialRecord {
    #[serde(default, deserialize_with = "lenient_section")]
    pub company: CompanyMeta,
    #[serde(default, deserialize_with = "lenient_section")]
    pub data: FinancialData,
}

impl RawFinancialRecord {
    pub fn from_json(value: Value) -> Result<Self, InsightError> {
        serde_json::from_value(value).map_err(|e| InsightError::InvalidData(e.to_string()))
    }
}

/// Scalar company metadata (`id`, `company_name`, `roe_3_years`, ...).
///
/// Kept as a JSON object rather than a struct: the scoring rules need to tell
/// an absent key apart from a key that is present but null or garbage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyMeta(Map<String, Value>);

impl CompanyMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Return the first key from `keys` that is present in the metadata,
    /// together with its value. Keys are checked in the given order.
    pub fn first_present<'a>(&'a self, keys: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        keys.iter()
            .find_map(|key| self.0.get(*key).map(|value| (*key, value)))
    }

    /// Company identifier; the API sends it as a string or a number.
    pub fn id(&self) -> Option<String> {
        self.get("id").and_then(to_text)
    }

    pub fn company_name(&self) -> Option<String> {
        self.get("company_name").and_then(to_text)
    }
}

impl From<Map<String, Value>> for CompanyMeta {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Time series sections of the payload, oldest period first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialData {
    #[serde(rename = "profitandloss", default, deserialize_with = "lenient_periods")]
    pub profit_and_loss: Vec<ProfitLossPeriod>,
    #[serde(rename = "balancesheet", default, deserialize_with = "lenient_periods")]
    pub balance_sheet: Vec<BalanceSheetPeriod>,
}

/// One profit & loss period. Values are kept raw until scoring coerces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossPeriod {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sales: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub net_profit: Option<Value>,
}

impl ProfitLossPeriod {
    pub fn new(sales: f64, net_profit: f64) -> Self {
        Self {
            sales: Some(Value::from(sales)),
            net_profit: Some(Value::from(net_profit)),
        }
    }

    /// Numeric sales, `None` when missing or not a number.
    pub fn sales(&self) -> Option<f64> {
        to_series_value(self.sales.as_ref())
    }

    /// Numeric net profit, `None` when missing or not a number.
    pub fn net_profit(&self) -> Option<f64> {
        to_series_value(self.net_profit.as_ref())
    }
}

/// One balance sheet period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetPeriod {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub borrowings: Option<Value>,
}

impl BalanceSheetPeriod {
    pub fn new(borrowings: f64) -> Self {
        Self {
            borrowings: Some(Value::from(borrowings)),
        }
    }

    /// Borrowings with anything non-numeric (including a missing field) read as 0.
    pub fn borrowings_or_zero(&self) -> f64 {
        to_series_value(self.borrowings.as_ref()).unwrap_or(0.0)
    }
}

/// Per-company insight produced by the scoring engine and persisted by
/// company id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredInsight {
    pub company_id: String,
    pub company_name: String,
    /// At most three messages, highest priority first
    pub top_pros: Vec<String>,
    /// At most three messages, highest priority first
    pub top_cons: Vec<String>,
    pub roe: f64,
    pub sales_growth: f64,
    pub profit_growth: f64,
}

impl ScoredInsight {
    /// Replace any NaN or infinite metric with 0.
    pub fn sanitized(mut self) -> Self {
        self.roe = finite_or_zero(self.roe);
        self.sales_growth = finite_or_zero(self.sales_growth);
        self.profit_growth = finite_or_zero(self.profit_growth);
        self
    }

    /// Pros in storage form, `"pro 1|pro 2|pro 3"`.
    pub fn pros_delimited(&self) -> String {
        join_insights(&self.top_pros)
    }

    /// Cons in storage form, `"con 1|con 2"`.
    pub fn cons_delimited(&self) -> String {
        join_insights(&self.top_cons)
    }
}

/// Deserialize a section that should be a JSON object. Null or any other
/// type (string, array, number) yields the default instead of an error.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if !raw.is_object() {
        if !raw.is_null() {
            tracing::debug!("Ignoring malformed section, expected an object: {}", raw);
        }
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        tracing::debug!("Ignoring malformed section: {}", e);
        T::default()
    }))
}

/// Keep a field that is present with a `null` value as `Some(Value::Null)`,
/// so "present but empty" stays distinguishable from "absent".
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parse a period list. A section that is not an array reads as empty, and
/// entries that are not objects become empty periods.
fn lenient_periods<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => Vec::new(),
        other => {
            tracing::debug!("Ignoring malformed period list, expected an array: {}", other);
            Vec::new()
        }
    };
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let record = RawFinancialRecord::from_json(json!({
            "company": {"id": "TCS", "company_name": "Tata Consultancy", "roe_3_years": "45.2"},
            "data": {
                "profitandloss": [
                    {"year": "Mar 2022", "sales": "1000", "net_profit": 200},
                    {"year": "Mar 2023", "sales": 1200, "net_profit": "260.5"}
                ],
                "balancesheet": [{"borrowings": "0"}]
            }
        }))
        .unwrap();

        assert_eq!(record.company.id().as_deref(), Some("TCS"));
        assert_eq!(record.company.company_name().as_deref(), Some("Tata Consultancy"));
        assert_eq!(record.data.profit_and_loss.len(), 2);
        assert_eq!(record.data.profit_and_loss[0].sales(), Some(1000.0));
        assert_eq!(record.data.profit_and_loss[1].net_profit(), Some(260.5));
        assert_eq!(record.data.balance_sheet[0].borrowings_or_zero(), 0.0);
    }

    #[test]
    fn test_missing_and_null_sections() {
        let record = RawFinancialRecord::from_json(json!({"company": {"id": 7}})).unwrap();
        assert_eq!(record.company.id().as_deref(), Some("7"));
        assert!(record.data.profit_and_loss.is_empty());
        assert!(record.data.balance_sheet.is_empty());

        let record = RawFinancialRecord::from_json(json!({
            "company": null,
            "data": {"profitandloss": null}
        }))
        .unwrap();
        assert_eq!(record.company.id(), None);
        assert!(record.data.profit_and_loss.is_empty());
    }

    #[test]
    fn test_present_null_differs_from_absent() {
        let record = RawFinancialRecord::from_json(json!({
            "data": {"balancesheet": [{"borrowings": null}, {"reserves": 10}]}
        }))
        .unwrap();
        let periods = &record.data.balance_sheet;
        assert_eq!(periods[0].borrowings, Some(Value::Null));
        assert_eq!(periods[1].borrowings, None);
        assert_eq!(periods[0].borrowings_or_zero(), 0.0);
    }

    #[test]
    fn test_non_object_period_becomes_empty() {
        let record = RawFinancialRecord::from_json(json!({
            "data": {"profitandloss": ["garbage", {"sales": 10, "net_profit": 1}]}
        }))
        .unwrap();
        assert_eq!(record.data.profit_and_loss.len(), 2);
        assert_eq!(record.data.profit_and_loss[0].sales(), None);
        assert_eq!(record.data.profit_and_loss[1].sales(), Some(10.0));
    }

    #[test]
    fn test_period_list_of_wrong_type_reads_as_empty() {
        let record = RawFinancialRecord::from_json(json!({
            "company": {"id": "X", "roe_3_years": 20},
            "data": {"profitandloss": {"oops": 1}, "balancesheet": [{"borrowings": 0}]}
        }))
        .unwrap();
        assert!(record.data.profit_and_loss.is_empty());
        assert_eq!(record.data.balance_sheet.len(), 1);
        assert_eq!(record.company.id().as_deref(), Some("X"));

        let record = RawFinancialRecord::from_json(json!({
            "data": {"profitandloss": "n/a", "balancesheet": 42}
        }))
        .unwrap();
        assert!(record.data.profit_and_loss.is_empty());
        assert!(record.data.balance_sheet.is_empty());
    }

    #[test]
    fn test_sections_of_wrong_type_read_as_empty() {
        let record = RawFinancialRecord::from_json(json!({
            "company": {"id": "X", "dividend_payout_ratio": 15},
            "data": "n/a"
        }))
        .unwrap();
        assert!(record.data.profit_and_loss.is_empty());
        assert_eq!(record.company.get("dividend_payout_ratio"), Some(&json!(15)));

        let record = RawFinancialRecord::from_json(json!({
            "company": [],
            "data": {"balancesheet": [{"borrowings": 3}]}
        }))
        .unwrap();
        assert_eq!(record.company, CompanyMeta::new());
        assert_eq!(record.data.balance_sheet[0].borrowings_or_zero(), 3.0);
    }

    #[test]
    fn test_first_present_respects_order() {
        let mut meta = CompanyMeta::new();
        meta.insert("roe_percentage", 12.0).insert("roe_3_years", Value::Null);

        let (key, value) = meta.first_present(&["roe_3_years", "roe_percentage"]).unwrap();
        assert_eq!(key, "roe_3_years");
        assert!(value.is_null());
        assert!(meta.first_present(&["roe_5_years"]).is_none());
    }

    #[test]
    fn test_sanitized_insight() {
        let insight = ScoredInsight {
            company_id: "X".to_string(),
            company_name: UNKNOWN_COMPANY_NAME.to_string(),
            top_pros: vec!["a".to_string(), "b".to_string()],
            top_cons: vec![],
            roe: f64::NAN,
            sales_growth: f64::INFINITY,
            profit_growth: 12.34,
        }
        .sanitized();

        assert_eq!(insight.roe, 0.0);
        assert_eq!(insight.sales_growth, 0.0);
        assert_eq!(insight.profit_growth, 12.34);
        assert_eq!(insight.pros_delimited(), "a|b");
        assert_eq!(insight.cons_delimited(), "");
    }
}
