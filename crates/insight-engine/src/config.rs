use insight_core::InsightError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and limits used by the scoring engine.
///
/// Passed explicitly into [`crate::InsightEngine`]; `Default` carries the
/// production values. Can be loaded from a JSON file where any omitted field
/// keeps its default:
///
/// ```json
/// { "roe_pro_threshold": 18.0, "growth_horizons": [3, 5] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Look-back horizons in years for CAGR, tried in this order
    pub growth_horizons: Vec<u32>,
    /// Growth strictly above this (percent) is a pro
    pub growth_pro_threshold: f64,
    /// Growth strictly below this (percent) is a con
    pub growth_con_threshold: f64,
    /// ROE strictly above this (percent) is a pro
    pub roe_pro_threshold: f64,
    /// Positive ROE strictly below this (percent) is a con
    pub roe_con_threshold: f64,
    /// Latest borrowings at or below this count as debt-free
    pub debt_free_limit: f64,
    /// Dividend payout strictly above this (percent) is a pro
    pub dividend_pro_threshold: f64,
    /// Maximum pros and maximum cons kept in a scored insight
    pub max_insights: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            growth_horizons: vec![3, 5, 10],
            growth_pro_threshold: 10.0,
            growth_con_threshold: 5.0,
            roe_pro_threshold: 15.0,
            roe_con_threshold: 8.0,
            debt_free_limit: 1.0,
            dividend_pro_threshold: 10.0,
            max_insights: 3,
        }
    }
}

impl ScoringConfig {
    /// Load a scoring config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, InsightError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InsightError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            InsightError::ConfigError(format!("Invalid scoring config in {}: {}", path.display(), e))
        })
    }

    /// Check the config, collecting every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.growth_horizons.is_empty() {
            errors.push("growth_horizons: must contain at least one horizon".to_string());
        }
        if self.growth_horizons.contains(&0) {
            errors.push("growth_horizons: horizons must be at least 1 year".to_string());
        }
        if self.max_insights == 0 {
            errors.push("max_insights: must be at least 1".to_string());
        }

        let thresholds = [
            ("growth_pro_threshold", self.growth_pro_threshold),
            ("growth_con_threshold", self.growth_con_threshold),
            ("roe_pro_threshold", self.roe_pro_threshold),
            ("roe_con_threshold", self.roe_con_threshold),
            ("debt_free_limit", self.debt_free_limit),
            ("dividend_pro_threshold", self.dividend_pro_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                errors.push(format!("{}: must be a finite number", name));
            }
        }

        if self.growth_con_threshold > self.growth_pro_threshold {
            errors.push("growth_con_threshold: must not exceed growth_pro_threshold".to_string());
        }
        if self.roe_con_threshold > self.roe_pro_threshold {
            errors.push("roe_con_threshold: must not exceed roe_pro_threshold".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
