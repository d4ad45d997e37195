use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::ApplicantRecord;

/// Canned applicant profiles used for demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantPreset {
    Good,
    Borderline,
    Risky,
}

impl ApplicantPreset {
    pub const ALL: [ApplicantPreset; 3] = [
        ApplicantPreset::Good,
        ApplicantPreset::Borderline,
        ApplicantPreset::Risky,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApplicantPreset::Good => "Good Applicant",
            ApplicantPreset::Borderline => "Borderline",
            ApplicantPreset::Risky => "Risky Applicant",
        }
    }

    pub fn record(&self) -> ApplicantRecord {
        match self {
            ApplicantPreset::Good => ApplicantRecord {
                credit_utilization: 15.0,
                payment_history_months: 84.0,
                debt_to_income_ratio: 25.0,
                recent_inquiries: 1,
                annual_income: 8_000_000.0,
                loan_amount: 2_000_000.0,
            },
            ApplicantPreset::Borderline => ApplicantRecord {
                credit_utilization: 55.0,
                payment_history_months: 22.0,
                debt_to_income_ratio: 40.0,
                recent_inquiries: 3,
                annual_income: 5_000_000.0,
                loan_amount: 2_500_000.0,
            },
            ApplicantPreset::Risky => ApplicantRecord {
                credit_utilization: 92.0,
                payment_history_months: 9.0,
                debt_to_income_ratio: 55.0,
                recent_inquiries: 6,
                annual_income: 3_000_000.0,
                loan_amount: 1_500_000.0,
            },
        }
    }
}

impl fmt::Display for ApplicantPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicantPreset {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "good" | "good applicant" => Ok(Self::Good),
            "borderline" => Ok(Self::Borderline),
            "risky" | "risky applicant" => Ok(Self::Risky),
            other => Err(format!(
                "unknown preset '{other}' (expected good, borderline, or risky)"
            )),
        }
    }
}
