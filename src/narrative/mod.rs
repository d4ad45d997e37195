//! Text-generation boundary: explanations, follow-up chat, and document extraction.
//!
//! The scoring core never depends on this module. Implementations are injected
//! into the assessment service, which treats every failure as recoverable.

mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::scoring::{ApplicantRecord, PartialApplicantRecord, ScoringResult};

/// Provider of generated prose and best-effort field extraction.
pub trait NarrativeAdapter: Send + Sync {
    /// Explain a decision to the applicant in plain language.
    fn explain(
        &self,
        record: &ApplicantRecord,
        result: &ScoringResult,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Produce the next model turn, answering only from the supplied data.
    fn chat(
        &self,
        record: &ApplicantRecord,
        result: &ScoringResult,
        history: &[ChatTurn],
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Recover whichever of the six fields the document states. Missing fields are omitted.
    fn extract_fields(
        &self,
        document: &DocumentUpload,
    ) -> impl Future<Output = Result<PartialApplicantRecord, ServiceError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of a loan-manager conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Uploaded file handed to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Build an upload, guessing the MIME type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Failure talking to the narrative provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("narrative provider credentials are not configured")]
    MissingCredentials,
    #[error("narrative provider unreachable: {0}")]
    Transport(String),
    #[error("narrative provider rate limited the request")]
    RateLimited,
    #[error("narrative provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("narrative provider returned no text")]
    EmptyResponse,
    #[error("narrative provider returned malformed output: {0}")]
    Malformed(String),
    #[error("invalid chat history: {0}")]
    InvalidHistory(String),
}
