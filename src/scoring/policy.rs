use super::domain::{Decision, FeatureImpact, FeatureImportance};
use super::rules::FactorBreakdown;

pub const BASELINE_SCORE: f64 = 650.0;
pub const MIN_SCORE: u16 = 300;
pub const MAX_SCORE: u16 = 850;
pub const APPROVAL_THRESHOLD: u16 = 670;

/// Fixed normalization shared by both models; not derived from realized impacts.
pub const TOTAL_IMPACT_RANGE: f64 = 450.0;

/// Round the accumulated total once, then clamp into the reporting range.
pub(crate) fn final_score(breakdown: &FactorBreakdown) -> u16 {
    let rounded = breakdown.total(BASELINE_SCORE).round();
    rounded.clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u16
}

pub(crate) fn decide(score: u16) -> Decision {
    if score >= APPROVAL_THRESHOLD {
        Decision::Approved
    } else {
        Decision::Denied
    }
}

pub(crate) fn importance(impact: f64) -> FeatureImpact {
    FeatureImpact {
        impact,
        importance: (impact / TOTAL_IMPACT_RANGE).abs(),
    }
}

pub(crate) fn feature_importance(breakdown: &FactorBreakdown) -> FeatureImportance {
    FeatureImportance {
        credit_utilization: importance(breakdown.credit_utilization),
        payment_history_months: importance(breakdown.payment_history_months),
        debt_to_income_ratio: importance(breakdown.debt_to_income_ratio),
        recent_inquiries: importance(breakdown.recent_inquiries),
        annual_income: importance(breakdown.annual_income),
        loan_amount: importance(breakdown.loan_amount),
    }
}
