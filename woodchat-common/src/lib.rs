//! Common types and utilities shared across woodchat crates.
//!
//! This crate defines the JSON wire types exchanged between the chat surface
//! and the question-answering service, the [`AskBackend`] seam both sides
//! implement, and observability helpers. It stays dependency-light so every
//! crate in the workspace can use it.
//!
//! # Overview
//!
//! - [`AskRequest`] / [`AskResponse`] / [`ErrorBody`] / [`ReloadResponse`]: HTTP payloads
//! - [`FaqEntry`] and [`ChatLogEntry`]: rows of the FAQ store
//! - [`AskBackend`] and [`BackendError`]: "ask a question, get an answer"
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use woodchat_common::{AskResponse, is_contact_fallback, CONTACT_FALLBACK_ANSWER};
//!
//! let resp = AskResponse {
//!     answer: CONTACT_FALLBACK_ANSWER.to_string(),
//!     confidence: 0.1,
//! };
//! assert!(is_contact_fallback(&resp.answer));
//! ```
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod observability;

/// Answer returned when no FAQ entry is similar enough to the question.
pub const CONTACT_FALLBACK_ANSWER: &str = "I'm sorry, I don't have enough information to answer that question. Please contact our Tesa expert team at support@tesa.com or call us at +91-1234567890, Monday to Saturday, 9 AM to 6 PM.";

/// Whether `answer` is the low-confidence contact fallback.
pub fn is_contact_fallback(answer: &str) -> bool {
    answer.contains("I'm sorry, I don't have enough information")
        && answer.contains("Please contact our Tesa expert team")
}

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

/// Successful answer from the question-answering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub confidence: f64,
}

/// Error payload used by every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Result of `GET /admin/reload_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A question/answer pair, optionally tagged with the material it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            material: None,
            category: None,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

/// One answered question, kept for later analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub user_question: String,
    pub bot_answer: String,
    pub confidence_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Failure modes of an [`AskBackend`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The service answered with an error body (`{"error": ...}`).
    #[error("{0}")]
    Service(String),

    /// The service could not be reached or replied with something unreadable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can answer a free-form question.
///
/// Implemented by the remote HTTP client and by the in-process FAQ actor so
/// the chat surface does not care where answers come from.
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, question: &str) -> std::result::Result<AskResponse, BackendError>;

    /// Short label used in logs.
    fn describe(&self) -> &str {
        "backend"
    }
}
