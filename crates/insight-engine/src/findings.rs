use serde::Serialize;

/// Ranking weights for generated insights. Higher sorts first; the values are
/// never shown to users.
pub mod priority {
    pub const DEBT_FREE: u32 = 100;
    pub const ROE: u32 = 90;
    pub const PROFIT_GROWTH: u32 = 85;
    pub const SALES_GROWTH: u32 = 80;
    pub const DIVIDEND_PAYOUT: u32 = 75;
    pub const DEBT_REDUCED: u32 = 70;
    pub const NO_DIVIDEND: u32 = 60;
}

/// A single pro or con with its ranking weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub priority: u32,
    pub message: String,
}

/// Pros and cons collected across all analyses, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    pros: Vec<Finding>,
    cons: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pro(&mut self, priority: u32, message: impl Into<String>) {
        self.pros.push(Finding {
            priority,
            message: message.into(),
        });
    }

    pub fn con(&mut self, priority: u32, message: impl Into<String>) {
        self.cons.push(Finding {
            priority,
            message: message.into(),
        });
    }

    pub fn pros(&self) -> &[Finding] {
        &self.pros
    }

    pub fn cons(&self) -> &[Finding] {
        &self.cons
    }

    /// Consume the collection, returning `(pros, cons)` each ranked by
    /// priority descending. Equal priorities keep insertion order.
    pub fn into_ranked(mut self) -> (Vec<Finding>, Vec<Finding>) {
        rank(&mut self.pros);
        rank(&mut self.cons);
        (self.pros, self.cons)
    }
}

/// Stable sort by priority, highest first.
pub fn rank(findings: &mut [Finding]) {
    findings.sort_by(|a, b| b.priority.cmp(&a.priority));
}

/// Messages of the first `limit` findings of an already ranked list.
pub fn top_messages(ranked: &[Finding], limit: usize) -> Vec<String> {
    ranked
        .iter()
        .take(limit)
        .map(|f| f.message.clone())
        .collect()
}
