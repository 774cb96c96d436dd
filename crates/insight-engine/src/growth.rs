use insight_core::{InsightError, ProfitLossPeriod};

use crate::findings::{priority, Findings};
use crate::ScoringConfig;

/// Growth rate over one horizon, in percent per year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthFigure {
    pub horizon: u32,
    pub cagr: f64,
}

/// Representative sales and profit growth, chosen independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthSummary {
    pub sales: Option<GrowthFigure>,
    pub profit: Option<GrowthFigure>,
}

/// A period whose sales and net profit are both numeric.
#[derive(Debug, Clone, Copy)]
struct ValidPeriod {
    sales: f64,
    net_profit: f64,
}

/// Compound annual growth rate in percent, `None` when the result is NaN or
/// infinite.
pub fn cagr(start: f64, end: f64, years: u32) -> Option<f64> {
    let rate = ((end / start).powf(1.0 / years as f64) - 1.0) * 100.0;
    rate.is_finite().then_some(rate)
}

/// Keep `candidate` only if its magnitude beats the current best; earlier
/// horizons win ties.
fn keep_largest(best: &mut Option<GrowthFigure>, candidate: GrowthFigure) {
    match best {
        Some(current) if candidate.cagr.abs() <= current.cagr.abs() => {}
        _ => *best = Some(candidate),
    }
}

/// Pick the representative sales and profit CAGR over the configured horizons.
///
/// Periods with non-numeric sales or net profit are dropped first. A horizon
/// of `h` years needs `h + 1` valid periods. Sales growth needs a positive
/// base; profit growth needs a positive base and a positive latest value.
pub fn summarize_growth(
    periods: &[ProfitLossPeriod],
    horizons: &[u32],
) -> Result<GrowthSummary, InsightError> {
    let valid: Vec<ValidPeriod> = periods
        .iter()
        .filter_map(|p| {
            Some(ValidPeriod {
                sales: p.sales()?,
                net_profit: p.net_profit()?,
            })
        })
        .collect();

    if valid.len() < 2 {
        return Err(InsightError::InsufficientData(format!(
            "{} valid profit & loss periods, need at least 2",
            valid.len()
        )));
    }
    let latest = valid[valid.len() - 1];

    let mut summary = GrowthSummary::default();

    for &horizon in horizons.iter().filter(|h| **h > 0) {
        let steps = horizon as usize;
        if valid.len() < steps + 1 {
            continue;
        }
        let oldest = valid[valid.len() - 1 - steps];

        if oldest.sales > 0.0 {
            if let Some(rate) = cagr(oldest.sales, latest.sales, horizon) {
                keep_largest(&mut summary.sales, GrowthFigure { horizon, cagr: rate });
            }
        }

        if oldest.net_profit > 0.0 && latest.net_profit > 0.0 {
            if let Some(rate) = cagr(oldest.net_profit, latest.net_profit, horizon) {
                keep_largest(&mut summary.profit, GrowthFigure { horizon, cagr: rate });
            }
        }
    }

    Ok(summary)
}

/// Run the growth analysis: summarize, then turn the chosen figures into pros
/// and cons. Thresholds apply to the unrounded rate.
pub fn analyze_growth(
    periods: &[ProfitLossPeriod],
    config: &ScoringConfig,
    findings: &mut Findings,
) -> Result<GrowthSummary, InsightError> {
    let summary = summarize_growth(periods, &config.growth_horizons)?;

    if let Some(GrowthFigure { horizon, cagr }) = summary.sales {
        if cagr > config.growth_pro_threshold {
            findings.pro(
                priority::SALES_GROWTH,
                format!("Company's median sales growth is {:.2}% over last {} years", cagr, horizon),
            );
        } else if cagr < config.growth_con_threshold {
            findings.con(
                priority::SALES_GROWTH,
                format!(
                    "The company has delivered poor sales growth of {:.2}% over past {} years",
                    cagr, horizon
                ),
            );
        }
    }

    if let Some(GrowthFigure { horizon, cagr }) = summary.profit {
        if cagr > config.growth_pro_threshold {
            findings.pro(
                priority::PROFIT_GROWTH,
                format!("Company has delivered good profit growth of {:.2}%", cagr),
            );
        } else if cagr < config.growth_con_threshold {
            findings.con(
                priority::PROFIT_GROWTH,
                format!(
                    "The company has delivered poor profit growth of {:.2}% over past {} years",
                    cagr, horizon
                ),
            );
        }
    }

    Ok(summary)
}
