//! Error types for each fallible step, plus the HTTP mapping of service failures.
//!
//! Only `ServiceError` reaches the client, and only through its fixed public
//! message; the detailed variants are for logs and tests.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::protocol::ErrorOut;

/// Reading a predefined document failed. Always swallowed into a store miss.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to read predefined document: {0}")]
    Io(#[from] std::io::Error),

    #[error("predefined document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single call to the generation service failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key was available at startup.
    #[error("generation model not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx reply from the service.
    #[error("generation service HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The prompt was refused by the service's safety filters.
    #[error("prompt blocked by generation service: {0}")]
    Blocked(String),

    #[error("generation service returned no text")]
    EmptyResponse,

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Generated text was not a JSON document once fences were stripped.
#[derive(Debug, Error)]
#[error("generated text is not valid JSON: {0}")]
pub struct ParseError(#[from] pub serde_json::Error);

/// What a request is asking for; picks the client-facing wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    Roadmap,
    Quiz,
}

/// Terminal failure of a roadmap or quiz request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing {} parameter", .0.param())]
    MissingInput(Subject),

    #[error("generation model not configured")]
    NotConfigured,

    #[error("generation failed for {subject:?} '{name}': {source}")]
    Generation {
        subject: Subject,
        name: String,
        #[source]
        source: GenerationError,
    },

    #[error("could not parse generated {subject:?} for '{name}': {source}")]
    Parse {
        subject: Subject,
        name: String,
        #[source]
        source: ParseError,
    },
}

impl Subject {
    fn param(self) -> &'static str {
        match self {
            Subject::Roadmap => "skill",
            Subject::Quiz => "topic",
        }
    }

    fn failure_message(self, name: &str) -> String {
        match self {
            Subject::Roadmap => format!("Could not generate AI roadmap for '{name}'."),
            Subject::Quiz => format!("Could not generate quiz for '{name}'."),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MissingInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Never includes upstream error text.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::MissingInput(Subject::Roadmap) => "Skill parameter is required.".into(),
            ServiceError::MissingInput(Subject::Quiz) => "Topic parameter is required.".into(),
            ServiceError::NotConfigured => "Generative AI model is not configured. Check API key.".into(),
            ServiceError::Generation { subject, name, .. } | ServiceError::Parse { subject, name, .. } => {
                subject.failure_message(name)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(ErrorOut { error: self.public_message() })).into_response()
    }
}
