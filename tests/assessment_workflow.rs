use std::sync::Arc;

use credit_explainer::assessment::{greeting, AssessmentError, AssessmentService};
use credit_explainer::narrative::{
    prompt, ChatRole, ChatTurn, DocumentUpload, NarrativeAdapter, ServiceError,
};
use credit_explainer::scoring::{
    ApplicantPreset, ApplicantRecord, PartialApplicantRecord, ScoringModel, ScoringResult,
};

/// Answers from the prompt text so the flow exercises the real prompt builders.
struct EchoNarrator;

impl NarrativeAdapter for EchoNarrator {
    async fn explain(
        &self,
        record: &ApplicantRecord,
        result: &ScoringResult,
    ) -> Result<String, ServiceError> {
        let prompt = prompt::explanation_prompt(record, result);
        Ok(format!(
            "The decision was {}. The prompt was {} characters long. More detail follows.",
            result.decision,
            prompt.len()
        ))
    }

    async fn chat(
        &self,
        _record: &ApplicantRecord,
        result: &ScoringResult,
        history: &[ChatTurn],
    ) -> Result<String, ServiceError> {
        let turns = prompt::conversation(history)?;
        Ok(format!(
            "Answering {} turn(s) about a score of {}.",
            turns.len(),
            result.score
        ))
    }

    async fn extract_fields(
        &self,
        document: &DocumentUpload,
    ) -> Result<PartialApplicantRecord, ServiceError> {
        if document.bytes.is_empty() {
            return Ok(PartialApplicantRecord::default());
        }
        Ok(PartialApplicantRecord {
            credit_utilization: Some(15.0),
            payment_history_months: Some(84.0),
            ..PartialApplicantRecord::default()
        })
    }
}

fn service() -> AssessmentService<EchoNarrator> {
    AssessmentService::new(Arc::new(EchoNarrator))
}

#[tokio::test]
async fn assessment_then_conversation() {
    let service = service();
    let record = ApplicantPreset::Good.record();

    let assessment = service
        .assess(record, ScoringModel::Standard)
        .await
        .expect("assessment succeeds");
    assert_eq!(assessment.result.score, 758);
    let headline = assessment
        .analysis
        .key_message
        .as_deref()
        .expect("headline derived from explanation");
    assert!(headline.starts_with("The decision was Approved. The prompt was"));
    assert!(headline.ends_with("characters long."));
    assert!(assessment
        .narrative
        .text()
        .unwrap_or_default()
        .starts_with("The decision was Approved."));

    let mut history = vec![greeting(&assessment.result)];
    history.push(ChatTurn::user("Which factor helped most?"));
    let reply = service
        .chat(&assessment.record, assessment.result.model_type, &history)
        .await
        .expect("chat succeeds");

    assert_eq!(reply.role, ChatRole::Model);
    assert_eq!(reply.text, "Answering 1 turn(s) about a score of 758.");

    history.push(reply);
    history.push(ChatTurn::user("And the weakest?"));
    let follow_up = service
        .chat(&assessment.record, assessment.result.model_type, &history)
        .await
        .expect("follow-up succeeds");
    assert_eq!(follow_up.text, "Answering 3 turn(s) about a score of 758.");
}

#[tokio::test]
async fn document_assessment_reports_extracted_fields() {
    let service = service();

    let outcome = service
        .assess_document(
            DocumentUpload::new("credit-report.pdf", b"report".to_vec()),
            ScoringModel::DeepLearning,
        )
        .await
        .expect("document assessment succeeds");

    assert_eq!(outcome.extracted.field_count(), 2);
    assert_eq!(outcome.assessment.record.credit_utilization, 15.0);
    assert_eq!(outcome.assessment.record.payment_history_months, 84.0);
    assert_eq!(
        outcome.assessment.record.annual_income,
        ApplicantRecord::default().annual_income
    );
    assert_eq!(outcome.assessment.result.model_type, ScoringModel::DeepLearning);

    let empty = service
        .assess_document(
            DocumentUpload::new("empty.pdf", Vec::new()),
            ScoringModel::Standard,
        )
        .await;
    assert!(matches!(empty, Err(AssessmentError::NoFieldsExtracted)));
}

#[test]
fn zero_income_is_rejected_before_scoring() {
    let service = service();
    let record = ApplicantRecord {
        annual_income: 0.0,
        ..ApplicantRecord::default()
    };

    let outcome = service.score_only(&record, ScoringModel::Standard);

    assert!(matches!(outcome, Err(AssessmentError::Precondition(_))));
}
