use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::analysis::DecisionAnalysis;
use crate::narrative::{ChatTurn, DocumentUpload, NarrativeAdapter, ServiceError};
use crate::scoring::{
    self, ApplicantRecord, Factor, PartialApplicantRecord, PreconditionViolation, ScoringModel,
    ScoringResult,
};

/// Outcome of the narrative step; failure never discards the scoring result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeOutcome {
    Ready { text: String },
    Unavailable { message: String },
}

impl NarrativeOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            NarrativeOutcome::Ready { text } => Some(text),
            NarrativeOutcome::Unavailable { .. } => None,
        }
    }
}

/// Scored submission with its narrative and display analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub record: ApplicantRecord,
    pub result: ScoringResult,
    pub narrative: NarrativeOutcome,
    pub analysis: DecisionAnalysis,
    pub assessed_at: DateTime<Utc>,
}

/// Assessment produced from an uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAssessment {
    pub file_name: String,
    pub extracted: PartialApplicantRecord,
    pub extracted_fields: Vec<Factor>,
    pub assessment: Assessment,
}

/// Orchestrates validation, scoring, and narrative generation for one session.
pub struct AssessmentService<N> {
    narrator: Arc<N>,
    in_flight: AtomicBool,
}

/// Holds the single-submission slot until dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AssessmentError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AssessmentError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<N> AssessmentService<N>
where
    N: NarrativeAdapter + 'static,
{
    pub fn new(narrator: Arc<N>) -> Self {
        Self {
            narrator,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a narrative-backed request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate and score without contacting the narrative provider.
    pub fn score_only(
        &self,
        record: &ApplicantRecord,
        model: ScoringModel,
    ) -> Result<ScoringResult, AssessmentError> {
        record.validate()?;
        Ok(scoring::score(record, model))
    }

    /// Score a record and request its explanation.
    pub async fn assess(
        &self,
        record: ApplicantRecord,
        model: ScoringModel,
    ) -> Result<Assessment, AssessmentError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        self.assess_unguarded(record, model).await
    }

    async fn assess_unguarded(
        &self,
        record: ApplicantRecord,
        model: ScoringModel,
    ) -> Result<Assessment, AssessmentError> {
        let result = self.score_only(&record, model)?;
        info!(
            score = result.score,
            decision = %result.decision,
            model = %model,
            "scored application"
        );

        let narrative = match self.narrator.explain(&record, &result).await {
            Ok(text) => NarrativeOutcome::Ready { text },
            Err(err) => {
                warn!(error = %err, "explanation unavailable, returning scoring result only");
                NarrativeOutcome::Unavailable {
                    message: format!(
                        "The explanation could not be generated right now ({err}). \
                         The scoring result is unaffected."
                    ),
                }
            }
        };

        let analysis = DecisionAnalysis::build(&record, &result, narrative.text());
        Ok(Assessment {
            record,
            result,
            narrative,
            analysis,
            assessed_at: Utc::now(),
        })
    }

    /// Answer a loan manager's follow-up question about a scored application.
    ///
    /// The record is rescored under `model`; callers never supply the result.
    pub async fn chat(
        &self,
        record: &ApplicantRecord,
        model: ScoringModel,
        history: &[ChatTurn],
    ) -> Result<ChatTurn, AssessmentError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let result = self.score_only(record, model)?;

        let text = self
            .narrator
            .chat(record, &result, history)
            .await
            .map_err(|err| {
                warn!(error = %err, turns = history.len(), "chat response unavailable");
                err
            })?;

        Ok(ChatTurn::model(text))
    }

    /// Extract fields from a document, merge them over the form defaults, and assess.
    pub async fn assess_document(
        &self,
        document: DocumentUpload,
        model: ScoringModel,
    ) -> Result<DocumentAssessment, AssessmentError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let extracted = self
            .narrator
            .extract_fields(&document)
            .await
            .map_err(|err| {
                warn!(file = %document.file_name, error = %err, "document extraction failed");
                err
            })?;

        if extracted.is_empty() {
            info!(file = %document.file_name, "document yielded no applicant fields");
            return Err(AssessmentError::NoFieldsExtracted);
        }

        let extracted_fields = extracted.fields();
        info!(
            file = %document.file_name,
            fields = extracted_fields.len(),
            "merged extracted fields over defaults"
        );

        let record = extracted.merge_over(ApplicantRecord::default());
        let assessment = self.assess_unguarded(record, model).await?;

        Ok(DocumentAssessment {
            file_name: document.file_name,
            extracted,
            extracted_fields,
            assessment,
        })
    }
}

/// Opening model turn shown when a conversation about a result begins.
pub fn greeting(result: &ScoringResult) -> ChatTurn {
    ChatTurn::model(format!(
        "I have analyzed the application for you. The model's decision was **{}** with a score \
         of **{}**. How can I assist you further?",
        result.decision, result.score
    ))
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid applicant record: {0}")]
    Precondition(#[from] PreconditionViolation),
    #[error("another submission is still being processed")]
    Busy,
    #[error(
        "could not extract any required fields from the document; please enter the details manually"
    )]
    NoFieldsExtracted,
    #[error(transparent)]
    Narrative(#[from] ServiceError),
}
