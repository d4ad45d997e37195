//! Deterministic credit scoring over a six-field applicant record.
//!
//! Two simulated models share one shape: a 650 baseline, six signed factor
//! impacts accumulated in floating point, a single rounding step, a clamp into
//! 300..=850, and a 670 approval threshold. Reported importance is each
//! impact's magnitude over a fixed 450-point range, so importances need not
//! sum to one.

pub mod domain;
mod policy;
mod presets;
mod rules;

pub use domain::{
    ApplicantRecord, Decision, Factor, FeatureImpact, FeatureImportance, PartialApplicantRecord,
    PreconditionViolation, ScoringModel, ScoringResult,
};
pub use policy::{APPROVAL_THRESHOLD, BASELINE_SCORE, MAX_SCORE, MIN_SCORE, TOTAL_IMPACT_RANGE};
pub use presets::ApplicantPreset;

/// Score a record with the selected model.
///
/// Pure and total over finite inputs. `annual_income` must be positive; callers
/// are expected to run [`ApplicantRecord::validate`] first.
pub fn score(record: &ApplicantRecord, model: ScoringModel) -> ScoringResult {
    let breakdown = rules::breakdown(record, model);
    let score = policy::final_score(&breakdown);

    ScoringResult {
        score,
        decision: policy::decide(score),
        feature_importance: policy::feature_importance(&breakdown),
        model_type: model,
    }
}

/// Points applied to the total that no single factor entry accounts for.
pub fn unattributed_adjustment(record: &ApplicantRecord, model: ScoringModel) -> f64 {
    rules::breakdown(record, model).unattributed
}

impl ScoringModel {
    pub fn score(&self, record: &ApplicantRecord) -> ScoringResult {
        score(record, *self)
    }
}
