//! Assessment flow: validation, scoring, narrative, and the HTTP surface.
//!
//! A service instance stands for one loan-manager session. It admits a single
//! narrative-backed request at a time and rejects overlapping submissions as
//! busy instead of queueing them.

pub mod analysis;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use analysis::{
    key_message, ranked_factors, score_fraction, top_factors, DecisionAnalysis, ImpactDirection,
    MetricBand, ProfileSnapshot, RankedFactor, ScoreTier,
};
pub use router::assessment_router;
pub use service::{
    greeting, Assessment, AssessmentError, AssessmentService, DocumentAssessment,
    NarrativeOutcome,
};
