use credit_explainer::assessment::AssessmentService;
use credit_explainer::config::NarrativeConfig;
use credit_explainer::error::AppError;
use credit_explainer::narrative::GeminiClient;
use credit_explainer::scoring::{ApplicantPreset, ScoringModel};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the assessment service around the configured Gemini client.
pub(crate) fn gemini_service(
    config: NarrativeConfig,
) -> Result<AssessmentService<GeminiClient>, AppError> {
    if !config.has_credentials() {
        warn!("GEMINI_API_KEY is not set; explanations, chat, and extraction will be unavailable");
    }
    let client = GeminiClient::new(config)?;
    Ok(AssessmentService::new(Arc::new(client)))
}

pub(crate) fn parse_model(raw: &str) -> Result<ScoringModel, String> {
    match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "standard" | "standard-risk" => Ok(ScoringModel::Standard),
        "deep-learning" | "deeplearning" | "deep" => Ok(ScoringModel::DeepLearning),
        other => Err(format!(
            "unknown model '{other}' (expected standard or deep-learning)"
        )),
    }
}

pub(crate) fn parse_preset(raw: &str) -> Result<ApplicantPreset, String> {
    raw.parse()
}
