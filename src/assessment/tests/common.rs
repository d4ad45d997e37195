use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::assessment::{assessment_router, AssessmentService};
use crate::narrative::prompt;
use crate::narrative::{ChatTurn, DocumentUpload, NarrativeAdapter, ServiceError};
use crate::scoring::{
    ApplicantPreset, ApplicantRecord, PartialApplicantRecord, ScoringResult,
};

pub(super) const EXPLANATION: &str = "Your long payment history worked in your favour. \
     Your utilization is low. Keep inquiries to a minimum.";

pub(super) fn good_record() -> ApplicantRecord {
    ApplicantPreset::Good.record()
}

pub(super) fn risky_record() -> ApplicantRecord {
    ApplicantPreset::Risky.record()
}

pub(super) fn invalid_record() -> ApplicantRecord {
    ApplicantRecord {
        credit_utilization: 140.0,
        ..ApplicantRecord::default()
    }
}

/// Narrator returning canned outcomes and recording what it was asked.
#[derive(Clone)]
pub(super) struct ScriptedNarrator {
    explanation: Result<String, ServiceError>,
    reply: Result<String, ServiceError>,
    extraction: Result<PartialApplicantRecord, ServiceError>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    documents: Arc<Mutex<Vec<DocumentUpload>>>,
    chat_results: Arc<Mutex<Vec<ScoringResult>>>,
}

impl Default for ScriptedNarrator {
    fn default() -> Self {
        Self {
            explanation: Ok(EXPLANATION.to_string()),
            reply: Ok("Reducing utilization below 30% would help most.".to_string()),
            extraction: Ok(PartialApplicantRecord::default()),
            calls: Arc::default(),
            documents: Arc::default(),
            chat_results: Arc::default(),
        }
    }
}

impl ScriptedNarrator {
    pub(super) fn failing(error: ServiceError) -> Self {
        Self {
            explanation: Err(error.clone()),
            reply: Err(error.clone()),
            extraction: Err(error),
            ..Self::default()
        }
    }

    pub(super) fn extracting(fields: PartialApplicantRecord) -> Self {
        Self {
            extraction: Ok(fields),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn documents(&self) -> Vec<DocumentUpload> {
        self.documents
            .lock()
            .expect("documents mutex poisoned")
            .clone()
    }

    /// Results the narrator was asked to discuss in chat.
    pub(super) fn chat_results(&self) -> Vec<ScoringResult> {
        self.chat_results
            .lock()
            .expect("chat results mutex poisoned")
            .clone()
    }

    fn record_call(&self, name: &'static str) {
        self.calls.lock().expect("calls mutex poisoned").push(name);
    }
}

impl NarrativeAdapter for ScriptedNarrator {
    async fn explain(
        &self,
        _record: &ApplicantRecord,
        _result: &ScoringResult,
    ) -> Result<String, ServiceError> {
        self.record_call("explain");
        self.explanation.clone()
    }

    async fn chat(
        &self,
        _record: &ApplicantRecord,
        result: &ScoringResult,
        history: &[ChatTurn],
    ) -> Result<String, ServiceError> {
        self.record_call("chat");
        self.chat_results
            .lock()
            .expect("chat results mutex poisoned")
            .push(*result);
        prompt::conversation(history)?;
        self.reply.clone()
    }

    async fn extract_fields(
        &self,
        document: &DocumentUpload,
    ) -> Result<PartialApplicantRecord, ServiceError> {
        self.record_call("extract");
        self.documents
            .lock()
            .expect("documents mutex poisoned")
            .push(document.clone());
        self.extraction.clone()
    }
}

/// Narrator that parks inside `explain` until released.
#[derive(Clone, Default)]
pub(super) struct GatedNarrator {
    pub(super) entered: Arc<Notify>,
    pub(super) release: Arc<Notify>,
}

impl NarrativeAdapter for GatedNarrator {
    async fn explain(
        &self,
        _record: &ApplicantRecord,
        _result: &ScoringResult,
    ) -> Result<String, ServiceError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(EXPLANATION.to_string())
    }

    async fn chat(
        &self,
        _record: &ApplicantRecord,
        _result: &ScoringResult,
        _history: &[ChatTurn],
    ) -> Result<String, ServiceError> {
        Ok("gated".to_string())
    }

    async fn extract_fields(
        &self,
        _document: &DocumentUpload,
    ) -> Result<PartialApplicantRecord, ServiceError> {
        Ok(PartialApplicantRecord::default())
    }
}

pub(super) fn build_service(
    narrator: ScriptedNarrator,
) -> (Arc<AssessmentService<ScriptedNarrator>>, ScriptedNarrator) {
    let service = Arc::new(AssessmentService::new(Arc::new(narrator.clone())));
    (service, narrator)
}

pub(super) fn router_with_service(
    service: Arc<AssessmentService<ScriptedNarrator>>,
) -> axum::Router {
    assessment_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}
