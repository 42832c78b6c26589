//! Configuration service implementation.
//!
//! Loads `AppConfig` from `config.toml` and caches it.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use postpilot_core::Result;
use postpilot_core::config::AppConfig;
use tracing::debug;

use crate::paths::PostPilotPaths;

/// Loads and caches the application configuration.
///
/// A missing file yields the defaults; a file that does not parse is an
/// error rather than silently ignored.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &PostPilotPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Gets the configuration, reading the file on first access.
    pub fn load(&self) -> Result<AppConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = self.read_file()?;

        let mut slot = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(loaded.clone());
        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut slot = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    fn read_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        debug!(path = %self.path.display(), mode = %config.ideas.mode, "config loaded");
        Ok(config)
    }
}
