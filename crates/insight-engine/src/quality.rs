use insight_core::coerce::to_numeric;
use insight_core::{BalanceSheetPeriod, CompanyMeta, InsightError};
use serde::Serialize;

use crate::findings::{priority, Findings};
use crate::ScoringConfig;

/// Metadata keys consulted for the representative ROE, in order. The first key
/// present wins even if its value turns out to be unusable.
pub const ROE_FIELDS: &[&str] = &["roe_3_years", "roe_percentage"];
pub const ROE_5Y_FIELD: &str = "roe_5_years";
pub const DIVIDEND_PAYOUT_FIELD: &str = "dividend_payout_ratio";

/// ROE figures read from company metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoeReadings {
    /// Short-horizon ROE used for scoring and stored as the `roe` metric
    pub representative: f64,
    /// Parsed alongside the representative figure but not scored
    pub five_year: f64,
}

/// Parse a scalar metadata field. Absent means `default`; present but not
/// numeric is an error.
fn scalar(value: Option<&serde_json::Value>, field: &str, default: f64) -> Result<f64, InsightError> {
    match value {
        None => Ok(default),
        Some(raw) => to_numeric(raw)
            .ok_or_else(|| InsightError::InvalidData(format!("{} is not numeric: {}", field, raw))),
    }
}

/// Debt analysis over the balance sheet. Only ever produces pros.
pub fn analyze_debt(
    periods: &[BalanceSheetPeriod],
    config: &ScoringConfig,
    findings: &mut Findings,
) -> Result<(), InsightError> {
    if !periods.iter().any(|p| p.borrowings.is_some()) {
        return Err(InsightError::InsufficientData(
            "no borrowings reported in balance sheet".to_string(),
        ));
    }

    let borrowings: Vec<f64> = periods.iter().map(BalanceSheetPeriod::borrowings_or_zero).collect();
    let latest = borrowings[borrowings.len() - 1];

    if latest <= config.debt_free_limit {
        findings.pro(priority::DEBT_FREE, "Company is almost debt-free.");
    } else if borrowings.len() >= 2 && latest < borrowings[borrowings.len() - 2] {
        findings.pro(priority::DEBT_REDUCED, "Company has reduced debt.");
    }

    Ok(())
}

/// Read the representative and five-year ROE. Either failing to parse
/// rejects both.
pub fn read_roe(meta: &CompanyMeta) -> Result<RoeReadings, InsightError> {
    let representative = match meta.first_present(ROE_FIELDS) {
        Some((field, value)) => scalar(Some(value), field, 0.0)?,
        None => 0.0,
    };
    let five_year = scalar(meta.get(ROE_5Y_FIELD), ROE_5Y_FIELD, 0.0)?;

    Ok(RoeReadings {
        representative,
        five_year,
    })
}

pub fn analyze_roe(
    meta: &CompanyMeta,
    config: &ScoringConfig,
    findings: &mut Findings,
) -> Result<RoeReadings, InsightError> {
    let readings = read_roe(meta)?;
    let roe = readings.representative;

    if roe > config.roe_pro_threshold {
        findings.pro(
            priority::ROE,
            format!(
                "Company has good return on equity (ROE) track record: 3 Years ROE {:.1}%",
                roe
            ),
        );
    } else if roe > 0.0 && roe < config.roe_con_threshold {
        findings.con(
            priority::ROE,
            format!("Company has low return on equity of {:.2}% over last 3 years", roe),
        );
    }

    Ok(readings)
}

/// Dividend analysis. A missing payout counts as zero and is reported as a con.
pub fn analyze_dividend(
    meta: &CompanyMeta,
    config: &ScoringConfig,
    findings: &mut Findings,
) -> Result<f64, InsightError> {
    let payout = scalar(meta.get(DIVIDEND_PAYOUT_FIELD), DIVIDEND_PAYOUT_FIELD, 0.0)?;

    if payout > config.dividend_pro_threshold {
        findings.pro(
            priority::DIVIDEND_PAYOUT,
            format!("Company has been maintaining healthy dividend payout of {:.1}%", payout),
        );
    } else if payout == 0.0 {
        findings.con(priority::NO_DIVIDEND, "Company is not paying out dividend");
    }

    Ok(payout)
}
