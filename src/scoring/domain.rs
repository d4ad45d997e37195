use std::fmt;

use serde::{Deserialize, Serialize};

/// Six-field financial profile describing one loan applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    /// Percent of revolving credit in use, 0 to 100.
    pub credit_utilization: f64,
    /// Length of the repayment history in months, at least 1.
    pub payment_history_months: f64,
    /// Percent of income committed to debt service, 0 to 100.
    pub debt_to_income_ratio: f64,
    /// Hard inquiries in the last six months.
    pub recent_inquiries: u32,
    /// Gross annual income in rupees, strictly positive.
    pub annual_income: f64,
    /// Requested principal in rupees, strictly positive.
    pub loan_amount: f64,
}

impl Default for ApplicantRecord {
    /// Values pre-filled on the manual entry form; extracted documents merge over these.
    fn default() -> Self {
        Self {
            credit_utilization: 45.0,
            payment_history_months: 18.0,
            debt_to_income_ratio: 30.0,
            recent_inquiries: 3,
            annual_income: 4_500_000.0,
            loan_amount: 1_000_000.0,
        }
    }
}

impl ApplicantRecord {
    /// Check the record against its field domains, reporting the first violation.
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        check_percent(Factor::CreditUtilization, self.credit_utilization)?;

        check_finite(Factor::PaymentHistoryMonths, self.payment_history_months)?;
        if self.payment_history_months < 1.0 {
            return Err(PreconditionViolation::BelowMinimum {
                field: Factor::PaymentHistoryMonths,
                min: 1.0,
                found: self.payment_history_months,
            });
        }

        check_percent(Factor::DebtToIncomeRatio, self.debt_to_income_ratio)?;
        check_positive(Factor::AnnualIncome, self.annual_income)?;
        check_positive(Factor::LoanAmount, self.loan_amount)?;

        Ok(())
    }

    /// Raw input value for a factor, widened to `f64`.
    pub fn value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::CreditUtilization => self.credit_utilization,
            Factor::PaymentHistoryMonths => self.payment_history_months,
            Factor::DebtToIncomeRatio => self.debt_to_income_ratio,
            Factor::RecentInquiries => f64::from(self.recent_inquiries),
            Factor::AnnualIncome => self.annual_income,
            Factor::LoanAmount => self.loan_amount,
        }
    }

    pub fn loan_to_income(&self) -> f64 {
        self.loan_amount / self.annual_income
    }
}

fn check_finite(field: Factor, value: f64) -> Result<(), PreconditionViolation> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PreconditionViolation::NonFinite { field })
    }
}

fn check_percent(field: Factor, value: f64) -> Result<(), PreconditionViolation> {
    check_finite(field, value)?;
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(PreconditionViolation::OutOfRange {
            field,
            min: 0.0,
            max: 100.0,
            found: value,
        })
    }
}

fn check_positive(field: Factor, value: f64) -> Result<(), PreconditionViolation> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(PreconditionViolation::NotPositive {
            field,
            found: value,
        })
    }
}

/// Rejection raised when a record falls outside the domain the engine is defined on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("{field} must be a finite number")]
    NonFinite { field: Factor },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: Factor,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} must be at least {min} (found {found})")]
    BelowMinimum { field: Factor, min: f64, found: f64 },
    #[error("{field} must be greater than zero (found {found})")]
    NotPositive { field: Factor, found: f64 },
}

impl PreconditionViolation {
    pub fn field(&self) -> Factor {
        match self {
            PreconditionViolation::NonFinite { field }
            | PreconditionViolation::OutOfRange { field, .. }
            | PreconditionViolation::BelowMinimum { field, .. }
            | PreconditionViolation::NotPositive { field, .. } => *field,
        }
    }
}

/// Applicant fields recovered from a document; absent keys were not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialApplicantRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_utilization: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_history_months: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_to_income_ratio: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_count"
    )]
    pub recent_inquiries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<f64>,
}

/// Providers report every field as a JSON number, so counts may arrive fractional.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    raw.map(|value| {
        if value.is_finite() {
            Ok(value.round().clamp(0.0, f64::from(u32::MAX)) as u32)
        } else {
            Err(serde::de::Error::custom("inquiry count must be finite"))
        }
    })
    .transpose()
}

impl PartialApplicantRecord {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    /// Factors present in this partial record, in canonical order.
    pub fn fields(&self) -> Vec<Factor> {
        Factor::ALL
            .into_iter()
            .filter(|factor| match factor {
                Factor::CreditUtilization => self.credit_utilization.is_some(),
                Factor::PaymentHistoryMonths => self.payment_history_months.is_some(),
                Factor::DebtToIncomeRatio => self.debt_to_income_ratio.is_some(),
                Factor::RecentInquiries => self.recent_inquiries.is_some(),
                Factor::AnnualIncome => self.annual_income.is_some(),
                Factor::LoanAmount => self.loan_amount.is_some(),
            })
            .collect()
    }

    /// Overlay the present fields onto `base`.
    pub fn merge_over(&self, base: ApplicantRecord) -> ApplicantRecord {
        ApplicantRecord {
            credit_utilization: self.credit_utilization.unwrap_or(base.credit_utilization),
            payment_history_months: self
                .payment_history_months
                .unwrap_or(base.payment_history_months),
            debt_to_income_ratio: self
                .debt_to_income_ratio
                .unwrap_or(base.debt_to_income_ratio),
            recent_inquiries: self.recent_inquiries.unwrap_or(base.recent_inquiries),
            annual_income: self.annual_income.unwrap_or(base.annual_income),
            loan_amount: self.loan_amount.unwrap_or(base.loan_amount),
        }
    }
}

/// The six tracked scoring factors, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    CreditUtilization,
    PaymentHistoryMonths,
    DebtToIncomeRatio,
    RecentInquiries,
    AnnualIncome,
    LoanAmount,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::CreditUtilization,
        Factor::PaymentHistoryMonths,
        Factor::DebtToIncomeRatio,
        Factor::RecentInquiries,
        Factor::AnnualIncome,
        Factor::LoanAmount,
    ];

    /// Wire name used in JSON payloads and provider schemas.
    pub fn key(&self) -> &'static str {
        match self {
            Factor::CreditUtilization => "creditUtilization",
            Factor::PaymentHistoryMonths => "paymentHistoryMonths",
            Factor::DebtToIncomeRatio => "debtToIncomeRatio",
            Factor::RecentInquiries => "recentInquiries",
            Factor::AnnualIncome => "annualIncome",
            Factor::LoanAmount => "loanAmount",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Factor::CreditUtilization => "Credit Utilization",
            Factor::PaymentHistoryMonths => "Payment History",
            Factor::DebtToIncomeRatio => "DTI Ratio",
            Factor::RecentInquiries => "Recent Inquiries",
            Factor::AnnualIncome => "Annual Income",
            Factor::LoanAmount => "Loan Amount",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Signed point contribution of one factor and its normalized magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub impact: f64,
    pub importance: f64,
}

/// Per-factor breakdown; every factor is always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureImportance {
    pub credit_utilization: FeatureImpact,
    pub payment_history_months: FeatureImpact,
    pub debt_to_income_ratio: FeatureImpact,
    pub recent_inquiries: FeatureImpact,
    pub annual_income: FeatureImpact,
    pub loan_amount: FeatureImpact,
}

impl FeatureImportance {
    pub fn get(&self, factor: Factor) -> &FeatureImpact {
        match factor {
            Factor::CreditUtilization => &self.credit_utilization,
            Factor::PaymentHistoryMonths => &self.payment_history_months,
            Factor::DebtToIncomeRatio => &self.debt_to_income_ratio,
            Factor::RecentInquiries => &self.recent_inquiries,
            Factor::AnnualIncome => &self.annual_income,
            Factor::LoanAmount => &self.loan_amount,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, &FeatureImpact)> + '_ {
        Factor::ALL
            .into_iter()
            .map(move |factor| (factor, self.get(factor)))
    }
}

/// Binary credit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Denied => "Denied",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Simulated model variant used to score a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringModel {
    #[default]
    Standard,
    DeepLearning,
}

impl ScoringModel {
    pub const ALL: [ScoringModel; 2] = [ScoringModel::Standard, ScoringModel::DeepLearning];

    pub fn label(&self) -> &'static str {
        match self {
            ScoringModel::Standard => "Standard Risk Model",
            ScoringModel::DeepLearning => "Deep Learning Model",
        }
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Engine output: clamped score, decision, and the per-factor breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub score: u16,
    pub decision: Decision,
    pub feature_importance: FeatureImportance,
    pub model_type: ScoringModel,
}

impl ScoringResult {
    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }
}
