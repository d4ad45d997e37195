use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use super::service::{AssessmentError, AssessmentService};
use crate::narrative::{ChatTurn, DocumentUpload, NarrativeAdapter, ServiceError};
use crate::scoring::{ApplicantPreset, ApplicantRecord, ScoringModel};

/// Body accepted by the assessment and score-only endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub applicant: ApplicantRecord,
    #[serde(default)]
    pub model: ScoringModel,
}

/// Follow-up question; the result under discussion is recomputed from `applicant`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub applicant: ApplicantRecord,
    #[serde(default)]
    pub model: ScoringModel,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRequest {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub content_base64: String,
    #[serde(default)]
    pub model: ScoringModel,
}

/// Router builder exposing scoring, explanation, chat, and document intake.
pub fn assessment_router<N>(service: Arc<AssessmentService<N>>) -> Router
where
    N: NarrativeAdapter + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assess_handler::<N>))
        .route("/api/v1/assessments/score", post(score_handler::<N>))
        .route("/api/v1/assessments/chat", post(chat_handler::<N>))
        .route("/api/v1/documents/assess", post(document_handler::<N>))
        .route("/api/v1/presets", get(presets_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    payload: Result<axum::Json<AssessmentRequest>, JsonRejection>,
) -> Response
where
    N: NarrativeAdapter + 'static,
{
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.assess(request.applicant, request.model).await {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    payload: Result<axum::Json<AssessmentRequest>, JsonRejection>,
) -> Response
where
    N: NarrativeAdapter + 'static,
{
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.score_only(&request.applicant, request.model) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn chat_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    payload: Result<axum::Json<ChatRequest>, JsonRejection>,
) -> Response
where
    N: NarrativeAdapter + 'static,
{
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    match service
        .chat(&request.applicant, request.model, &request.history)
        .await
    {
        Ok(turn) => (StatusCode::OK, axum::Json(turn)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn document_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    payload: Result<axum::Json<DocumentRequest>, JsonRejection>,
) -> Response
where
    N: NarrativeAdapter + 'static,
{
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    let bytes = match base64::engine::general_purpose::STANDARD
        .decode(request.content_base64.trim().as_bytes())
    {
        Ok(bytes) => bytes,
        Err(err) => {
            let payload = json!({
                "error": format!("content_base64 is not valid base64: {err}"),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let mut document = DocumentUpload::new(request.file_name, bytes);
    if let Some(mime_type) = request.mime_type.filter(|value| !value.trim().is_empty()) {
        document = document.with_mime_type(mime_type);
    }

    match service.assess_document(document, request.model).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn presets_handler() -> Response {
    let presets: Vec<_> = ApplicantPreset::ALL
        .into_iter()
        .map(|preset| {
            json!({
                "preset": preset,
                "label": preset.label(),
                "applicant": preset.record(),
            })
        })
        .collect();

    let payload = json!({
        "default": ApplicantRecord::default(),
        "presets": presets,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

/// Body rejections keep axum's status but use the `{"error": ...}` shape.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

pub(crate) fn error_response(err: AssessmentError) -> Response {
    let status = match &err {
        AssessmentError::Precondition(_) | AssessmentError::NoFieldsExtracted => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentError::Busy => StatusCode::CONFLICT,
        AssessmentError::Narrative(ServiceError::InvalidHistory(_)) => StatusCode::BAD_REQUEST,
        AssessmentError::Narrative(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
