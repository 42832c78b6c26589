//! Secret service implementation.
//!
//! Reads `secret.json`, layers `POSTPILOT_*` environment variables on top and
//! caches the result. A section whose values are blank counts as missing, so
//! the template written by `ensure_secret_file` is not mistaken for real
//! credentials.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use postpilot_core::Result;
use postpilot_core::config::{
    GeminiConfig, ImageWorkerConfig, LinkedInConfig, NewsApiConfig, SecretConfig,
};
use postpilot_core::secret::SecretService;
use serde::Deserialize;
use tracing::debug;

use crate::paths::PostPilotPaths;

pub const GEMINI_API_KEY_ENV: &str = "POSTPILOT_GEMINI_API_KEY";
pub const NEWS_API_KEY_ENV: &str = "POSTPILOT_NEWS_API_KEY";
pub const IMAGE_WORKER_URL_ENV: &str = "POSTPILOT_IMAGE_WORKER_URL";
pub const IMAGE_WORKER_KEY_ENV: &str = "POSTPILOT_IMAGE_WORKER_KEY";
pub const LINKEDIN_PROXY_URL_ENV: &str = "POSTPILOT_LINKEDIN_PROXY_URL";
pub const LINKEDIN_ACCESS_TOKEN_ENV: &str = "POSTPILOT_LINKEDIN_ACCESS_TOKEN";
pub const LINKEDIN_AUTHOR_URN_ENV: &str = "POSTPILOT_LINKEDIN_AUTHOR_URN";

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// `secret.json` as written on disk. Any field may be missing; the
/// environment can fill it in before the sections are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretFile {
    gemini: Option<GeminiSection>,
    news: Option<NewsSection>,
    image_worker: Option<ImageWorkerSection>,
    linkedin: Option<LinkedInSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeminiSection {
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewsSection {
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageWorkerSection {
    endpoint: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkedInSection {
    proxy_url: Option<String>,
    access_token: Option<String>,
    author_urn: Option<String>,
}

/// Service for loading secret configuration.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    env: Arc<EnvLookup>,
    /// Uses RwLock for thread-safe lazy loading.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    /// Reads `secret.json` from `paths` and overrides from the process environment.
    pub fn new(paths: &PostPilotPaths) -> Self {
        Self::with_env(paths.secret_file(), |name| std::env::var(name).ok())
    }

    /// Uses `env` instead of the process environment.
    pub fn with_env<F>(path: impl Into<PathBuf>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            env: Arc::new(env),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    async fn read_file(&self) -> Result<SecretFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no secret file, relying on environment");
                Ok(SecretFile::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn env_value(&self, name: &str) -> Option<String> {
        (self.env)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Each field: environment first, then file; blank means unset.
    /// A section exists only when every one of its fields is set.
    fn merge(&self, file: SecretFile) -> SecretConfig {
        let pick = |env_name: &str, file_value: Option<String>| -> Option<String> {
            self.env_value(env_name).or_else(|| {
                file_value
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
            })
        };

        let gemini = pick(GEMINI_API_KEY_ENV, file.gemini.and_then(|g| g.api_key))
            .map(|api_key| GeminiConfig { api_key });

        let news = pick(NEWS_API_KEY_ENV, file.news.and_then(|n| n.api_key))
            .map(|api_key| NewsApiConfig { api_key });

        let worker = file.image_worker.unwrap_or_default();
        let image_worker = pick(IMAGE_WORKER_URL_ENV, worker.endpoint)
            .zip(pick(IMAGE_WORKER_KEY_ENV, worker.api_key))
            .map(|(endpoint, api_key)| ImageWorkerConfig { endpoint, api_key });

        let linkedin = file.linkedin.unwrap_or_default();
        let linkedin = match (
            pick(LINKEDIN_PROXY_URL_ENV, linkedin.proxy_url),
            pick(LINKEDIN_ACCESS_TOKEN_ENV, linkedin.access_token),
            pick(LINKEDIN_AUTHOR_URN_ENV, linkedin.author_urn),
        ) {
            (Some(proxy_url), Some(access_token), Some(author_urn)) => Some(LinkedInConfig {
                proxy_url,
                access_token,
                author_urn,
            }),
            _ => None,
        };

        SecretConfig {
            gemini,
            news,
            image_worker,
            linkedin,
        }
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        {
            let cached = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref secrets) = *cached {
                return Ok(secrets.clone());
            }
        }

        let loaded = self.merge(self.read_file().await?);
        debug!(secrets = ?loaded, "secrets loaded");

        let mut slot = self.secrets.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(loaded.clone());
        Ok(loaded)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
