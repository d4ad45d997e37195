use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::prompt;
use super::{ChatRole, ChatTurn, DocumentUpload, NarrativeAdapter, ServiceError};
use crate::config::NarrativeConfig;
use crate::scoring::{ApplicantRecord, PartialApplicantRecord, ScoringResult};

/// `generateContent` client for Gemini-compatible endpoints.
pub struct GeminiClient {
    http: reqwest::Client,
    config: NarrativeConfig,
}

impl GeminiClient {
    pub fn new(config: NarrativeConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, ServiceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ServiceError::MissingCredentials)?;

        let url = self.endpoint(model);
        debug!(%model, "requesting generated content");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(%model, error = %err, "narrative provider unreachable");
                ServiceError::Transport(err.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(%model, "narrative provider rate limited request");
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%model, status = status.as_u16(), "narrative provider returned error");
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::Malformed(err.to_string()))?;

        payload.text().ok_or(ServiceError::EmptyResponse)
    }
}

impl NarrativeAdapter for GeminiClient {
    async fn explain(
        &self,
        record: &ApplicantRecord,
        result: &ScoringResult,
    ) -> Result<String, ServiceError> {
        let request = GenerateContentRequest::single_turn(vec![Part::text(
            prompt::explanation_prompt(record, result),
        )]);
        self.generate(&self.config.explanation_model, &request)
            .await
    }

    async fn chat(
        &self,
        record: &ApplicantRecord,
        result: &ScoringResult,
        history: &[ChatTurn],
    ) -> Result<String, ServiceError> {
        let turns = prompt::conversation(history)?;
        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(prompt::chat_system_instruction(record, result))],
            }),
            contents: turns.iter().map(Content::from_turn).collect(),
            generation_config: None,
        };
        self.generate(&self.config.chat_model, &request).await
    }

    async fn extract_fields(
        &self,
        document: &DocumentUpload,
    ) -> Result<PartialApplicantRecord, ServiceError> {
        let mut request = GenerateContentRequest::single_turn(vec![
            Part::text(prompt::extraction_prompt()),
            Part::inline(&document.mime_type, &document.bytes),
        ]);
        request.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: prompt::extraction_schema(),
        });

        let raw = self
            .generate(&self.config.extraction_model, &request)
            .await?;
        parse_extraction(&raw)
    }
}

/// Parse the extractor's JSON reply, tolerating a fenced code block around it.
pub(crate) fn parse_extraction(raw: &str) -> Result<PartialApplicantRecord, ServiceError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|err| ServiceError::Malformed(err.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn single_turn(parts: Vec<Part>) -> Self {
        Self {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn from_turn(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part::text(turn.text.clone())],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any non-blank text.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
