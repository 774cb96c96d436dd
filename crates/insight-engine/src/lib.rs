//! Scoring engine: turns a raw company payload into growth and quality metrics
//! plus a ranked, capped list of pros and cons.
//!
//! The engine is synchronous and holds nothing but its [`ScoringConfig`], so one
//! instance can be shared behind an `Arc` by any number of tasks.

pub mod config;
pub mod findings;
pub mod growth;
pub mod quality;

pub use config::ScoringConfig;
pub use findings::{priority, Finding, Findings};
pub use growth::{GrowthFigure, GrowthSummary};
pub use quality::RoeReadings;

use insight_core::{InsightError, RawFinancialRecord, ScoredInsight, UNKNOWN_COMPANY_NAME};
use serde::Serialize;

/// Numeric outputs of an analysis. `None` means the metric could not be
/// derived and is stored as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub roe: Option<f64>,
    pub sales_growth: Option<f64>,
    pub profit_growth: Option<f64>,
}

/// Full, untruncated result of scoring one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Empty when the payload carries no `id`
    pub company_id: String,
    pub company_name: String,
    /// Ranked by priority, highest first
    pub pros: Vec<Finding>,
    /// Ranked by priority, highest first
    pub cons: Vec<Finding>,
    pub metrics: Metrics,
    pub roe_readings: Option<RoeReadings>,
}

impl Analysis {
    /// Keep the first `max` pros and cons and zero out non-finite metrics.
    pub fn into_insight(self, max: usize) -> ScoredInsight {
        ScoredInsight {
            company_id: self.company_id,
            company_name: self.company_name,
            top_pros: findings::top_messages(&self.pros, max),
            top_cons: findings::top_messages(&self.cons, max),
            roe: self.metrics.roe.unwrap_or(0.0),
            sales_growth: self.metrics.sales_growth.unwrap_or(0.0),
            profit_growth: self.metrics.profit_growth.unwrap_or(0.0),
        }
        .sanitized()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: ScoringConfig,
}

impl InsightEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Run every sub-analysis over `raw`. Never fails: a sub-analysis that
    /// errors is logged and contributes nothing.
    pub fn analyze(&self, raw: &RawFinancialRecord) -> Analysis {
        let company_id = raw.company.id().unwrap_or_default();
        let company_name = raw
            .company
            .company_name()
            .unwrap_or_else(|| UNKNOWN_COMPANY_NAME.to_string());

        let mut findings = Findings::new();
        let mut metrics = Metrics::default();

        if let Some(summary) = self.step(
            &company_id,
            "growth",
            growth::analyze_growth(&raw.data.profit_and_loss, &self.config, &mut findings),
        ) {
            metrics.sales_growth = summary.sales.map(|g| round2(g.cagr));
            metrics.profit_growth = summary.profit.map(|g| round2(g.cagr));
        }

        // Dividend payout is only scored for companies that report profit & loss
        if !raw.data.profit_and_loss.is_empty() {
            self.step(
                &company_id,
                "dividend",
                quality::analyze_dividend(&raw.company, &self.config, &mut findings),
            );
        }

        self.step(
            &company_id,
            "debt",
            quality::analyze_debt(&raw.data.balance_sheet, &self.config, &mut findings),
        );

        let roe_readings = self.step(
            &company_id,
            "roe",
            quality::analyze_roe(&raw.company, &self.config, &mut findings),
        );
        metrics.roe = roe_readings.map(|r| r.representative);

        let (pros, cons) = findings.into_ranked();

        tracing::debug!(
            "Analyzed {}: {} pros, {} cons",
            company_id,
            pros.len(),
            cons.len()
        );

        Analysis {
            company_id,
            company_name,
            pros,
            cons,
            metrics,
            roe_readings,
        }
    }

    /// Analyze and reduce to the persisted form.
    pub fn score(&self, raw: &RawFinancialRecord) -> ScoredInsight {
        self.analyze(raw).into_insight(self.config.max_insights)
    }

    fn step<T>(&self, company_id: &str, name: &str, result: Result<T, InsightError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(InsightError::InsufficientData(reason)) => {
                tracing::debug!("Skipping {} analysis for {}: {}", name, company_id, reason);
                None
            }
            Err(e) => {
                tracing::warn!("{} analysis failed for {}: {}", name, company_id, e);
                None
            }
        }
    }
}

/// Score `raw` with an explicit config.
pub fn score(raw: &RawFinancialRecord, config: &ScoringConfig) -> ScoredInsight {
    InsightEngine::new(config.clone()).score(raw)
}

/// Round to two decimals via decimal formatting (exact halves round to even,
/// e.g. 0.125 -> 0.12), so the stored figure matches what the messages print.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
