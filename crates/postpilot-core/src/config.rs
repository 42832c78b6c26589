//! Configuration types.
//!
//! Tunables live in `config.toml` ([`AppConfig`]); credentials live in
//! `secret.json` ([`SecretConfig`]). Every tunable has a default so a missing
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

use crate::error::{PostPilotError, Result};

/// How the idea source gathers recent news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IdeaSourceMode {
    /// Query the news API, then hand the compacted articles to the model.
    NewsDigest,
    /// Let the model search on its own through the `google_search` tool.
    #[default]
    SearchGrounded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeasConfig {
    pub mode: IdeaSourceMode,
    pub query: String,
    pub language: String,
    pub window_days: u32,
    pub page_size: u32,
    /// Max characters of each article description kept in the prompt.
    pub description_budget: usize,
    pub sort_by: String,
    pub timeout_secs: u64,
    pub search_timeout_secs: u64,
}

impl Default for IdeasConfig {
    fn default() -> Self {
        Self {
            mode: IdeaSourceMode::default(),
            query: "AI OR technology OR innovation".to_string(),
            language: "en".to_string(),
            window_days: 10,
            page_size: 10,
            description_budget: 240,
            sort_by: "publishedAt".to_string(),
            timeout_secs: 30,
            search_timeout_secs: 15,
        }
    }
}

impl IdeasConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub base_url: String,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/everything".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    pub timeout_secs: u64,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub timeout_secs: u64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInSettings {
    /// Value of the `X-Restli-Protocol-Version` header.
    pub protocol_version: String,
    /// Value of the `LinkedIn-Version` header.
    pub api_version: String,
}

impl Default for LinkedInSettings {
    fn default() -> Self {
        Self {
            protocol_version: "2.0.0".to_string(),
            api_version: "202409".to_string(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ideas: IdeasConfig,
    pub gemini: GeminiSettings,
    pub news: NewsSettings,
    pub post: PostSettings,
    pub image: ImageSettings,
    pub linkedin: LinkedInSettings,
}

// ============================================================================
// Secrets
// ============================================================================

/// Gemini API configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
}

/// News search API configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsApiConfig {
    pub api_key: String,
}

/// Image generation worker configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageWorkerConfig {
    pub endpoint: String,
    pub api_key: String,
}

/// LinkedIn publishing configuration (reached through the forwarding proxy)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInConfig {
    pub proxy_url: String,
    pub access_token: String,
    /// e.g. `urn:li:person:abc123`
    pub author_urn: String,
}

/// Root of `secret.json`.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default)]
    pub news: Option<NewsApiConfig>,
    #[serde(default)]
    pub image_worker: Option<ImageWorkerConfig>,
    #[serde(default)]
    pub linkedin: Option<LinkedInConfig>,
}

impl SecretConfig {
    pub fn require_gemini(&self) -> Result<&GeminiConfig> {
        self.gemini
            .as_ref()
            .ok_or_else(|| PostPilotError::config("gemini.api_key is not configured"))
    }

    pub fn require_news(&self) -> Result<&NewsApiConfig> {
        self.news
            .as_ref()
            .ok_or_else(|| PostPilotError::config("news.api_key is not configured"))
    }

    pub fn require_image_worker(&self) -> Result<&ImageWorkerConfig> {
        self.image_worker.as_ref().ok_or_else(|| {
            PostPilotError::config("image_worker.endpoint / image_worker.api_key are not configured")
        })
    }

    pub fn require_linkedin(&self) -> Result<&LinkedInConfig> {
        self.linkedin.as_ref().ok_or_else(|| {
            PostPilotError::config(
                "linkedin.proxy_url / linkedin.access_token / linkedin.author_urn are not configured",
            )
        })
    }
}

const REDACTED: &str = "<redacted>";

impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("gemini", &self.gemini.as_ref().map(|_| REDACTED))
            .field("news", &self.news.as_ref().map(|_| REDACTED))
            .field(
                "image_worker",
                &self.image_worker.as_ref().map(|w| w.endpoint.as_str()),
            )
            .field(
                "linkedin",
                &self.linkedin.as_ref().map(|l| l.author_urn.as_str()),
            )
            .finish()
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &REDACTED)
            .finish()
    }
}

impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("api_key", &REDACTED)
            .finish()
    }
}

impl std::fmt::Debug for ImageWorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageWorkerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &REDACTED)
            .finish()
    }
}

impl std::fmt::Debug for LinkedInConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedInConfig")
            .field("proxy_url", &self.proxy_url)
            .field("access_token", &REDACTED)
            .field("author_urn", &self.author_urn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ideas.query, "AI OR technology OR innovation");
        assert_eq!(config.ideas.description_budget, 240);
        assert_eq!(config.linkedin.api_version, "202409");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [ideas]
            mode = "news_digest"
            window_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.ideas.mode, IdeaSourceMode::NewsDigest);
        assert_eq!(config.ideas.window_days, 3);
        assert_eq!(config.ideas.page_size, 10);
    }

    #[test]
    fn test_mode_parses_from_cli_spelling() {
        assert_eq!(
            "search_grounded".parse::<IdeaSourceMode>().unwrap(),
            IdeaSourceMode::SearchGrounded
        );
        assert_eq!(IdeaSourceMode::NewsDigest.to_string(), "news_digest");
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let secrets = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "AIza-very-secret".into(),
            }),
            linkedin: Some(LinkedInConfig {
                proxy_url: "https://proxy.example".into(),
                access_token: "AQW-token".into(),
                author_urn: "urn:li:person:me".into(),
            }),
            ..Default::default()
        };
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("AIza-very-secret"));
        assert!(!debug.contains("AQW-token"));
        assert!(debug.contains("urn:li:person:me"));
    }

    #[test]
    fn test_missing_section_names_key() {
        let err = SecretConfig::default().require_news().unwrap_err();
        assert!(err.to_string().contains("news.api_key"));
    }
}
