use super::domain::{ApplicantRecord, Factor, ScoringModel};

/// Unrounded point deltas produced by one model for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FactorBreakdown {
    pub credit_utilization: f64,
    pub payment_history_months: f64,
    pub debt_to_income_ratio: f64,
    pub recent_inquiries: f64,
    pub annual_income: f64,
    pub loan_amount: f64,
    /// Applied to the total but not attributed to any factor.
    pub unattributed: f64,
}

impl FactorBreakdown {
    pub fn impact(&self, factor: Factor) -> f64 {
        match factor {
            Factor::CreditUtilization => self.credit_utilization,
            Factor::PaymentHistoryMonths => self.payment_history_months,
            Factor::DebtToIncomeRatio => self.debt_to_income_ratio,
            Factor::RecentInquiries => self.recent_inquiries,
            Factor::AnnualIncome => self.annual_income,
            Factor::LoanAmount => self.loan_amount,
        }
    }

    /// Accumulate every delta onto `baseline` in canonical factor order.
    pub fn total(&self, baseline: f64) -> f64 {
        let attributed = Factor::ALL
            .into_iter()
            .fold(baseline, |running, factor| running + self.impact(factor));
        attributed + self.unattributed
    }
}

pub(crate) fn breakdown(record: &ApplicantRecord, model: ScoringModel) -> FactorBreakdown {
    match model {
        ScoringModel::Standard => standard(record),
        ScoringModel::DeepLearning => deep_learning(record),
    }
}

/// Independent per-factor terms with no cross-factor interaction.
fn standard(record: &ApplicantRecord) -> FactorBreakdown {
    let utilization = record.credit_utilization / 100.0;
    let credit_utilization = -utilization.powi(2) * 200.0;

    let months = record.payment_history_months;
    let payment_history_months = if months < 12.0 {
        -80.0
    } else if months < 36.0 {
        (months - 12.0) * 2.0 - 40.0
    } else {
        ((months - 36.0) * 1.5).min(100.0)
    };

    let debt_to_income_ratio = -(record.debt_to_income_ratio / 100.0) * 100.0;

    let recent_inquiries = -f64::from(record.recent_inquiries) * 15.0;

    // Capped at one crore.
    let annual_income = (record.annual_income / 1_000_000.0).min(10.0) * 10.0;

    let excess_lti = (record.loan_to_income() - 0.5).max(0.0);
    let loan_amount = -excess_lti.powf(1.5) * 50.0;

    FactorBreakdown {
        credit_utilization,
        payment_history_months,
        debt_to_income_ratio,
        recent_inquiries,
        annual_income,
        loan_amount,
        unattributed: 0.0,
    }
}

/// Non-linear terms with income, history, and DTI interactions.
fn deep_learning(record: &ApplicantRecord) -> FactorBreakdown {
    let utilization = record.credit_utilization / 100.0;
    let credit_utilization = -utilization.powi(3) * 250.0;

    // Months below one would push ln and sqrt out of their useful range.
    let months = record.payment_history_months.max(1.0);
    let payment_history_months = months.ln() * 25.0 - 50.0;

    let income_in_lakhs = record.annual_income / 100_000.0;
    let debt_to_income_ratio =
        -(record.debt_to_income_ratio / 100.0) * (150.0 - income_in_lakhs.min(100.0));

    let recent_inquiries = -f64::from(record.recent_inquiries) * (10.0 + 40.0 / months.sqrt());

    let annual_income = ((record.annual_income - 600_000.0) / 2_000_000.0).tanh() * 80.0;

    let loan_amount = -record.loan_to_income().powi(2) * (50.0 + record.debt_to_income_ratio);

    FactorBreakdown {
        credit_utilization,
        payment_history_months,
        debt_to_income_ratio,
        recent_inquiries,
        annual_income,
        loan_amount,
        unattributed: interaction_penalty(record),
    }
}

pub(crate) const INTERACTION_PENALTY: f64 = -50.0;

fn interaction_penalty(record: &ApplicantRecord) -> f64 {
    if record.debt_to_income_ratio > 40.0 && record.credit_utilization > 60.0 {
        INTERACTION_PENALTY
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApplicantRecord {
        ApplicantRecord {
            credit_utilization: 50.0,
            payment_history_months: 48.0,
            debt_to_income_ratio: 20.0,
            recent_inquiries: 2,
            annual_income: 2_000_000.0,
            loan_amount: 2_000_000.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn standard_terms_follow_closed_forms() {
        let parts = breakdown(&record(), ScoringModel::Standard);

        assert_close(parts.credit_utilization, -50.0);
        assert_close(parts.payment_history_months, 18.0);
        assert_close(parts.debt_to_income_ratio, -20.0);
        assert_close(parts.recent_inquiries, -30.0);
        assert_close(parts.annual_income, 20.0);
        // lti = 1.0, excess 0.5, 0.5^1.5 * 50
        assert_close(parts.loan_amount, -(0.5_f64.powf(1.5)) * 50.0);
        assert_eq!(parts.unattributed, 0.0);
    }

    #[test]
    fn standard_history_bands_split_at_twelve_and_thirty_six_months() {
        let at = |months: f64| {
            breakdown(
                &ApplicantRecord {
                    payment_history_months: months,
                    ..record()
                },
                ScoringModel::Standard,
            )
            .payment_history_months
        };

        assert_close(at(11.0), -80.0);
        assert_close(at(12.0), -40.0);
        assert_close(at(35.0), 6.0);
        assert_close(at(36.0), 0.0);
        assert_close(at(100.0), 96.0);
        assert_close(at(120.0), 100.0);
    }

    #[test]
    fn standard_income_bonus_caps_at_one_crore() {
        let capped = breakdown(
            &ApplicantRecord {
                annual_income: 50_000_000.0,
                ..record()
            },
            ScoringModel::Standard,
        );
        assert_close(capped.annual_income, 100.0);
    }

    #[test]
    fn deep_learning_terms_follow_closed_forms() {
        let parts = breakdown(&record(), ScoringModel::DeepLearning);

        assert_close(parts.credit_utilization, -0.125 * 250.0);
        assert_close(parts.payment_history_months, 48.0_f64.ln() * 25.0 - 50.0);
        assert_close(parts.debt_to_income_ratio, -0.2 * 130.0);
        assert_close(
            parts.recent_inquiries,
            -2.0 * (10.0 + 40.0 / 48.0_f64.sqrt()),
        );
        assert_close(parts.annual_income, 0.7_f64.tanh() * 80.0);
        assert_close(parts.loan_amount, -70.0);
        assert_eq!(parts.unattributed, 0.0);
    }

    #[test]
    fn deep_learning_tolerates_zero_month_history() {
        let parts = breakdown(
            &ApplicantRecord {
                payment_history_months: 0.0,
                ..record()
            },
            ScoringModel::DeepLearning,
        );

        assert_close(parts.payment_history_months, -50.0);
        assert_close(parts.recent_inquiries, -100.0);
    }

    #[test]
    fn interaction_penalty_requires_both_thresholds_strictly_exceeded() {
        let with = |dti: f64, utilization: f64| {
            breakdown(
                &ApplicantRecord {
                    debt_to_income_ratio: dti,
                    credit_utilization: utilization,
                    ..record()
                },
                ScoringModel::DeepLearning,
            )
            .unattributed
        };

        assert_eq!(with(41.0, 61.0), INTERACTION_PENALTY);
        assert_eq!(with(40.0, 90.0), 0.0);
        assert_eq!(with(90.0, 60.0), 0.0);
    }

    #[test]
    fn total_adds_unattributed_adjustment_after_factors() {
        let parts = FactorBreakdown {
            credit_utilization: -10.0,
            payment_history_months: 5.0,
            debt_to_income_ratio: -1.0,
            recent_inquiries: 0.0,
            annual_income: 2.5,
            loan_amount: 0.0,
            unattributed: -50.0,
        };

        assert_close(parts.total(650.0), 596.5);
    }
}
