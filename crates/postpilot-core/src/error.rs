//! Error types for PostPilot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters kept from a raw (non-JSON) error body.
pub const RAW_ERROR_SNIPPET_CHARS: usize = 100;

/// A shared error type for every PostPilot component.
///
/// Each external capability normalizes its failures into one of these
/// variants, so callers can branch on the kind of failure without parsing
/// message strings.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostPilotError {
    /// A request did not complete before its deadline.
    #[error("{operation} timed out after {seconds} seconds. Try again.")]
    NetworkTimeout { operation: String, seconds: u64 },

    /// The remote side answered with a non-success status. `message` is
    /// already phrased for display and includes the status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The model answered, but not with the structure we asked for.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// The news search returned zero articles.
    #[error("No articles found for the configured query")]
    NoArticlesFound,

    /// The model reported it could not produce ideas from its context.
    #[error("{0}")]
    InsufficientContext(String),

    /// The model response carried no generated content part.
    #[error("Received an unexpected or empty response structure from the Gemini API.")]
    EmptyModelResponse,

    /// The image worker answered 2xx with a non-image payload.
    #[error(
        "Worker returned non-image data. MIME Type: {mime_type}. Ensure worker returns image/jpeg or image/png."
    )]
    NonImageResponse { mime_type: String },

    /// The image worker answered with a non-success status.
    #[error("Worker Error: Status {status} - {message}...")]
    WorkerError { status: u16, message: String },

    /// Registering or uploading the image asset failed. Recoverable by
    /// publishing text-only once the user confirms.
    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// The user declined the text-only fallback.
    #[error("Publishing cancelled by user.")]
    PublishCancelled,

    /// The caller cancelled an in-flight operation.
    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (missing key, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl PostPilotError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NetworkTimeout error
    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::NetworkTimeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a MalformedModelOutput error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedModelOutput(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NetworkTimeout { .. })
    }

    /// Check if this error may be answered with a text-only fallback
    pub fn is_upload_failure(&self) -> bool {
        matches!(self, Self::UploadFailed(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::WorkerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Converts into the uniform `{error: message}` envelope.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.to_string(),
        }
    }
}

// ============================================================================
// Component boundary envelope
// ============================================================================

/// The `{ "error": "..." }` shape every component boundary reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

impl From<PostPilotError> for ErrorEnvelope {
    fn from(err: PostPilotError) -> Self {
        err.to_envelope()
    }
}

/// Result of a component call once normalized at its boundary.
pub type ComponentOutcome<T> = std::result::Result<T, ErrorEnvelope>;

// ============================================================================
// Message extraction helpers
// ============================================================================

/// Truncates `text` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Best-effort human readable message from an API error body.
///
/// Looks for `error.message`, then a string `error`, then a top-level
/// `message`; falls back to the raw body cut to [`RAW_ERROR_SNIPPET_CHARS`].
pub fn extract_api_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let from_json = json
            .get("error")
            .and_then(|err| {
                err.get("message")
                    .and_then(|m| m.as_str())
                    .or_else(|| err.as_str())
            })
            .or_else(|| json.get("message").and_then(|m| m.as_str()));
        if let Some(message) = from_json {
            return message.to_string();
        }
    }
    truncate_chars(body, RAW_ERROR_SNIPPET_CHARS).to_string()
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PostPilotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PostPilotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PostPilotError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PostPilotError>`.
pub type Result<T> = std::result::Result<T, PostPilotError>;
