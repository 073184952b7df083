//! Error types for audio-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (validation, extraction, artifact resolution)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for audio-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for audio-dl
///
/// Each variant carries enough context to pick a per-kind handling strategy:
/// validation failures are the caller's fault, extraction failures come from
/// the external tool, artifact misses mean the tool claimed success but left
/// nothing usable on disk.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "proxy.url")
        key: Option<String>,
    },

    /// Request validation failed (missing or empty required field)
    #[error("{message}")]
    Validation {
        /// Human-readable error message describing the invalid input
        message: String,
        /// The request field that failed validation, if known
        field: Option<String>,
    },

    /// The extraction tool ran but reported a failure
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The extraction tool could not be located or started
    #[error("extractor unavailable: {0}")]
    ExtractorUnavailable(String),

    /// Extraction reported success but no artifact matched any candidate extension
    #[error("no audio artifact found for {media_id}")]
    ArtifactNotFound {
        /// The media identifier whose artifact could not be located
        media_id: String,
        /// Partially-matching files found by the wildcard scan (diagnostic)
        files: Vec<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "url is required",
///     "details": {
///       "field": "url"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "extraction_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation { .. } => 400,

            // 500 Internal Server Error - extraction failures keep the
            // original surface's status even though the fault is upstream
            Error::Extraction(_) => 500,
            Error::ArtifactNotFound { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,

            // 503 Service Unavailable - the tool itself is missing
            Error::ExtractorUnavailable(_) => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::Extraction(_) => "extraction_error",
            Error::ExtractorUnavailable(_) => "extractor_unavailable",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({
                "field": field,
            })),
            Error::ArtifactNotFound { media_id, files } => Some(serde_json::json!({
                "media_id": media_id,
                "files": files,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

impl Error {
    /// Construct a validation error for a missing required field
    pub fn missing_field(field: &str) -> Self {
        Error::Validation {
            message: format!("{field} is required"),
            field: Some(field.to_string()),
        }
    }
}
