use serde::Serialize;

use crate::scoring::{
    unattributed_adjustment, ApplicantRecord, Factor, ScoringResult, APPROVAL_THRESHOLD,
    MAX_SCORE, MIN_SCORE,
};

const FAIR_SCORE_FLOOR: u16 = 580;

/// Whether a factor raised or lowered the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDirection {
    Positive,
    Negative,
}

/// One factor entry ordered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFactor {
    pub factor: Factor,
    pub label: &'static str,
    pub impact: f64,
    pub importance: f64,
    pub direction: ImpactDirection,
}

/// Factors sorted by importance, largest first; ties keep canonical order.
pub fn ranked_factors(result: &ScoringResult) -> Vec<RankedFactor> {
    let mut ranked: Vec<RankedFactor> = result
        .feature_importance
        .iter()
        .map(|(factor, entry)| RankedFactor {
            factor,
            label: factor.label(),
            impact: entry.impact,
            importance: entry.importance,
            direction: if entry.impact >= 0.0 {
                ImpactDirection::Positive
            } else {
                ImpactDirection::Negative
            },
        })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

pub fn top_factors(result: &ScoringResult, count: usize) -> Vec<RankedFactor> {
    let mut ranked = ranked_factors(result);
    ranked.truncate(count);
    ranked
}

/// Position of a score within the 300..=850 range, as a fraction.
pub fn score_fraction(score: u16) -> f64 {
    let span = f64::from(MAX_SCORE - MIN_SCORE);
    (f64::from(score.saturating_sub(MIN_SCORE)) / span).min(1.0)
}

/// Gauge colouring for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Good,
    Fair,
    Poor,
}

impl ScoreTier {
    pub fn for_score(score: u16) -> Self {
        if score >= APPROVAL_THRESHOLD {
            ScoreTier::Good
        } else if score >= FAIR_SCORE_FLOOR {
            ScoreTier::Fair
        } else {
            ScoreTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
            ScoreTier::Poor => "Poor",
        }
    }
}

/// First two sentences of an explanation, used as its headline.
pub fn key_message(explanation: &str) -> String {
    let sentences: Vec<&str> = explanation.trim().split('.').take(2).collect();
    format!("{}.", sentences.join("."))
}

struct BandTable {
    max: f64,
    bands: &'static [(f64, &'static str)],
}

impl BandTable {
    fn for_factor(factor: Factor) -> Self {
        match factor {
            Factor::CreditUtilization => Self {
                max: 100.0,
                bands: &[(30.0, "Good"), (50.0, "Fair"), (100.0, "Poor")],
            },
            Factor::PaymentHistoryMonths => Self {
                max: 120.0,
                bands: &[(12.0, "Poor"), (36.0, "Fair"), (120.0, "Good")],
            },
            Factor::DebtToIncomeRatio => Self {
                max: 100.0,
                bands: &[(36.0, "Good"), (43.0, "Fair"), (100.0, "Poor")],
            },
            Factor::RecentInquiries => Self {
                max: 10.0,
                bands: &[(2.0, "Good"), (4.0, "Fair"), (10.0, "Poor")],
            },
            Factor::AnnualIncome => Self {
                max: 10_000_000.0,
                bands: &[(2_500_000.0, "Low"), (6_000_000.0, "Medium"), (10_000_000.0, "High")],
            },
            Factor::LoanAmount => Self {
                max: 5_000_000.0,
                bands: &[(1_000_000.0, "Low"), (2_500_000.0, "Medium"), (5_000_000.0, "High")],
            },
        }
    }

    /// Values past the table maximum fall into the last band.
    fn rating(&self, value: f64) -> &'static str {
        self.bands
            .iter()
            .find(|(upper, _)| value <= *upper)
            .or_else(|| self.bands.last())
            .map(|(_, label)| *label)
            .unwrap_or("Unrated")
    }
}

/// Where one applicant field sits on its reference scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBand {
    pub factor: Factor,
    pub label: &'static str,
    pub value: f64,
    pub rating: &'static str,
    pub fill_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub metrics: Vec<MetricBand>,
}

impl ProfileSnapshot {
    pub fn from_record(record: &ApplicantRecord) -> Self {
        let metrics = Factor::ALL
            .into_iter()
            .map(|factor| {
                let table = BandTable::for_factor(factor);
                let value = record.value(factor);
                MetricBand {
                    factor,
                    label: factor.label(),
                    value,
                    rating: table.rating(value),
                    fill_fraction: (value / table.max).clamp(0.0, 1.0),
                }
            })
            .collect();

        Self { metrics }
    }

    pub fn metric(&self, factor: Factor) -> Option<&MetricBand> {
        self.metrics.iter().find(|metric| metric.factor == factor)
    }
}

/// Read model backing the decision panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionAnalysis {
    pub model_label: &'static str,
    pub score_fraction: f64,
    pub score_tier: ScoreTier,
    pub top_factors: Vec<RankedFactor>,
    /// Points applied by interaction terms outside the per-factor entries.
    pub unattributed_adjustment: f64,
    pub profile: ProfileSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_message: Option<String>,
}

impl DecisionAnalysis {
    pub fn build(
        record: &ApplicantRecord,
        result: &ScoringResult,
        explanation: Option<&str>,
    ) -> Self {
        Self {
            model_label: result.model_type.label(),
            score_fraction: score_fraction(result.score),
            score_tier: ScoreTier::for_score(result.score),
            top_factors: top_factors(result, 3),
            unattributed_adjustment: unattributed_adjustment(record, result.model_type),
            profile: ProfileSnapshot::from_record(record),
            key_message: explanation.map(key_message),
        }
    }
}
