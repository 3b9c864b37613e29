//! Error types for flowlens.
//!
//! Internal failures carry a stable machine-readable code for logs; the JSON
//! surface reports outcomes through [`ApiErrorEnvelope`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::UpstreamStage;

/// Result type alias for flowlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// flowlens error types.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream {stage} request failed with status {status}")]
    Upstream { stage: UpstreamStage, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error code for machine parsing.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Upstream { .. } => "UPSTREAM_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Toml(_) => "TOML_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}

/// API error categories, used by clients to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid request or unknown resource. Do not retry unchanged.
    ClientError,
    /// Upstream dashboard API misbehaved. May succeed later.
    Upstream,
}

/// Machine-parseable error codes for the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    WorkflowNotFound,
    UpstreamListingFailed,
    UpstreamValidationFailed,
}

impl ApiErrorCode {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiErrorCode::WorkflowNotFound => ErrorCategory::ClientError,
            ApiErrorCode::UpstreamListingFailed | ApiErrorCode::UpstreamValidationFailed => {
                ErrorCategory::Upstream
            }
        }
    }

    /// Get HTTP status code mapping.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiErrorCode::WorkflowNotFound => 404,
            ApiErrorCode::UpstreamListingFailed => 502,
            ApiErrorCode::UpstreamValidationFailed => 502,
        }
    }
}

/// Structured API error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    /// Machine-parseable error code.
    pub code: ApiErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Error category for retry logic.
    pub category: ErrorCategory,
    /// Request ID for log correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Additional context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorEnvelope {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            category: code.category(),
            request_id: None,
            details: None,
        }
    }

    pub fn with_request(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convert to JSON response body.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self
        })
    }
}
