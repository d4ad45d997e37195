use crate::infra::gemini_service;
use clap::Args;
use credit_explainer::assessment::{
    Assessment, AssessmentError, DecisionAnalysis, ImpactDirection, NarrativeOutcome,
};
use credit_explainer::config::AppConfig;
use credit_explainer::error::AppError;
use credit_explainer::narrative::prompt::format_inr;
use credit_explainer::narrative::DocumentUpload;
use credit_explainer::scoring::{
    self, ApplicantPreset, ApplicantRecord, PartialApplicantRecord, ScoringModel, ScoringResult,
};
use credit_explainer::telemetry;
use serde_json::json;
use std::path::PathBuf;

/// Individual field overrides layered over a preset or the form defaults.
#[derive(Args, Debug, Default)]
pub(crate) struct FieldArgs {
    /// Credit utilization in percent (0-100)
    #[arg(long)]
    pub(crate) credit_utilization: Option<f64>,
    /// Payment history length in months
    #[arg(long)]
    pub(crate) payment_history_months: Option<f64>,
    /// Debt-to-income ratio in percent (0-100)
    #[arg(long)]
    pub(crate) debt_to_income_ratio: Option<f64>,
    /// Hard inquiries in the last six months
    #[arg(long)]
    pub(crate) recent_inquiries: Option<u32>,
    /// Gross annual income in rupees
    #[arg(long)]
    pub(crate) annual_income: Option<f64>,
    /// Requested loan amount in rupees
    #[arg(long)]
    pub(crate) loan_amount: Option<f64>,
}

impl FieldArgs {
    fn overrides(&self) -> PartialApplicantRecord {
        PartialApplicantRecord {
            credit_utilization: self.credit_utilization,
            payment_history_months: self.payment_history_months,
            debt_to_income_ratio: self.debt_to_income_ratio,
            recent_inquiries: self.recent_inquiries,
            annual_income: self.annual_income,
            loan_amount: self.loan_amount,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Start from a preset applicant (good, borderline, risky)
    #[arg(long, value_parser = crate::infra::parse_preset)]
    pub(crate) preset: Option<ApplicantPreset>,
    #[command(flatten)]
    pub(crate) fields: FieldArgs,
    /// Scoring model (standard or deep-learning)
    #[arg(long, value_parser = crate::infra::parse_model, default_value = "standard")]
    pub(crate) model: ScoringModel,
    /// Request a plain-language explanation from the narrative provider
    #[arg(long)]
    pub(crate) explain: bool,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PresetsArgs {
    /// Print the scored presets as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// Document to read applicant details from (PDF, image, or text)
    pub(crate) path: PathBuf,
    /// Scoring model (standard or deep-learning)
    #[arg(long, value_parser = crate::infra::parse_model, default_value = "standard")]
    pub(crate) model: ScoringModel,
    /// Override the MIME type guessed from the file extension
    #[arg(long)]
    pub(crate) mime_type: Option<String>,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn applicant_from(preset: Option<ApplicantPreset>, fields: &FieldArgs) -> ApplicantRecord {
    let base = preset
        .map(|preset| preset.record())
        .unwrap_or_default();
    fields.overrides().merge_over(base)
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        preset,
        fields,
        model,
        explain,
        json,
    } = args;

    let record = applicant_from(preset, &fields);

    if explain {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;
        let service = gemini_service(config.narrative)?;
        let assessment = service.assess(record, model).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        } else {
            render_assessment(&assessment);
        }
        return Ok(());
    }

    record.validate().map_err(AssessmentError::from)?;
    let result = scoring::score(&record, model);
    let analysis = DecisionAnalysis::build(&record, &result, None);

    if json {
        let payload = json!({
            "applicant": record,
            "result": result,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        render_scorecard(&record, &result, &analysis);
    }

    Ok(())
}

pub(crate) fn run_presets(args: PresetsArgs) -> Result<(), AppError> {
    let scored: Vec<(ApplicantPreset, ScoringResult)> = ApplicantPreset::ALL
        .into_iter()
        .flat_map(|preset| {
            ScoringModel::ALL
                .into_iter()
                .map(move |model| (preset, scoring::score(&preset.record(), model)))
        })
        .collect();

    if args.json {
        let payload: Vec<_> = scored
            .iter()
            .map(|(preset, result)| {
                json!({
                    "preset": preset,
                    "applicant": preset.record(),
                    "result": result,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Preset applicants");
    for (preset, result) in &scored {
        println!(
            "- {:<16} | {:<20} | score {} -> {}",
            preset.label(),
            result.model_type.label(),
            result.score,
            result.decision
        );
    }

    Ok(())
}

pub(crate) async fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let ExtractArgs {
        path,
        model,
        mime_type,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let service = gemini_service(config.narrative)?;

    let bytes = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut document = DocumentUpload::new(file_name, bytes);
    if let Some(mime_type) = mime_type {
        document = document.with_mime_type(mime_type);
    }

    let outcome = service.assess_document(document, model).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Extracted from {}:", outcome.file_name);
    for factor in &outcome.extracted_fields {
        println!(
            "  - {}: {}",
            factor.label(),
            outcome.assessment.record.value(*factor)
        );
    }
    println!("Remaining fields use the form defaults.\n");
    render_assessment(&outcome.assessment);

    Ok(())
}

fn render_assessment(assessment: &Assessment) {
    render_scorecard(&assessment.record, &assessment.result, &assessment.analysis);

    match &assessment.narrative {
        NarrativeOutcome::Ready { text } => {
            if let Some(headline) = &assessment.analysis.key_message {
                println!("\nKey message: {headline}");
            }
            println!("\nExplanation:\n{text}");
        }
        NarrativeOutcome::Unavailable { message } => {
            println!("\nExplanation unavailable: {message}");
        }
    }
}

fn render_scorecard(record: &ApplicantRecord, result: &ScoringResult, analysis: &DecisionAnalysis) {
    println!("{}", analysis.model_label);
    println!(
        "Score {} ({}, {:.0}% of range) -> {}",
        result.score,
        analysis.score_tier.label(),
        analysis.score_fraction * 100.0,
        result.decision
    );
    println!(
        "Applicant: income {} | loan {}",
        format_inr(record.annual_income),
        format_inr(record.loan_amount)
    );

    println!("Top factors:");
    for factor in &analysis.top_factors {
        let arrow = match factor.direction {
            ImpactDirection::Positive => "+",
            ImpactDirection::Negative => "-",
        };
        println!(
            "  {} {:<18} {:>7.1} pts | importance {:.1}%",
            arrow,
            factor.label,
            factor.impact,
            factor.importance * 100.0
        );
    }
    if analysis.unattributed_adjustment != 0.0 {
        println!(
            "  Interaction adjustment: {:.0} pts (not attributed to a single factor)",
            analysis.unattributed_adjustment
        );
    }

    println!("Profile:");
    for metric in &analysis.profile.metrics {
        println!(
            "  - {:<18} {:>12} | {:<6} | {:.0}% of scale",
            metric.label,
            metric.value,
            metric.rating,
            metric.fill_fraction * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_flags_override_preset_values() {
        let fields = FieldArgs {
            loan_amount: Some(3_000_000.0),
            ..FieldArgs::default()
        };

        let record = applicant_from(Some(ApplicantPreset::Good), &fields);

        assert_eq!(record.loan_amount, 3_000_000.0);
        assert_eq!(record.annual_income, 8_000_000.0);
    }

    #[test]
    fn missing_preset_starts_from_form_defaults() {
        let record = applicant_from(None, &FieldArgs::default());
        assert_eq!(record, ApplicantRecord::default());
    }
}
