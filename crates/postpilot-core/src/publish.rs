//! Publish results and the text-only fallback decision.

use serde::{Deserialize, Serialize};

/// Reference to the created post, taken from the `Location` response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PostHandle {
    Location(String),
    /// The platform did not return a location. Not a failure.
    Unavailable,
}

impl PostHandle {
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(location) if !location.is_empty() => Self::Location(location.to_string()),
            _ => Self::Unavailable,
        }
    }

    /// Last `:`-separated segment of the URN, e.g. the numeric share id.
    pub fn short_id(&self) -> &str {
        match self {
            Self::Location(location) => location.rsplit(':').next().unwrap_or(location),
            Self::Unavailable => "N/A",
        }
    }
}

impl std::fmt::Display for PostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Location(location) => f.write_str(location),
            Self::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Outcome of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    /// URN of the uploaded media asset, if the image survived.
    pub asset_urn: Option<String>,
    pub post_handle: PostHandle,
    pub success: bool,
}

impl PublishResult {
    pub fn published(asset_urn: Option<String>, post_handle: PostHandle) -> Self {
        Self {
            asset_urn,
            post_handle,
            success: true,
        }
    }

    pub fn short_id(&self) -> &str {
        self.post_handle.short_id()
    }
}

/// The user's answer when the image upload fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackDecision {
    /// Stop; nothing gets published.
    Abort,
    /// Drop the image and publish the text alone.
    ContinueTextOnly,
}
