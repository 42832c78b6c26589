//! Path management for PostPilot configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/postpilot/         # Config directory (or $POSTPILOT_CONFIG_DIR)
//! ├── config.toml              # Tunables (AppConfig)
//! └── secret.json              # API keys and tokens (SecretConfig)
//! ```

use std::path::{Path, PathBuf};

use postpilot_core::config::{
    GeminiConfig, ImageWorkerConfig, LinkedInConfig, NewsApiConfig, SecretConfig,
};
use postpilot_core::{PostPilotError, Result};

/// Overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "POSTPILOT_CONFIG_DIR";

const APP_DIR_NAME: &str = "postpilot";
const CONFIG_FILE_NAME: &str = "config.toml";
const SECRET_FILE_NAME: &str = "secret.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPilotPaths {
    config_dir: PathBuf,
}

impl PostPilotPaths {
    /// Resolves the configuration directory.
    ///
    /// `$POSTPILOT_CONFIG_DIR` wins; otherwise the platform config directory
    /// (e.g. `~/.config`) joined with `postpilot`.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(Self::with_base(PathBuf::from(dir)));
        }
        let base = dirs::config_dir()
            .ok_or_else(|| PostPilotError::config("Cannot find home directory"))?;
        Ok(Self::with_base(base.join(APP_DIR_NAME)))
    }

    /// Uses `config_dir` as is. Handy for tests.
    pub fn with_base(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Path to `secret.json`. Keep it readable by the owner only.
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join(SECRET_FILE_NAME)
    }

    /// Writes a `secret.json` template with empty values unless one exists.
    ///
    /// On Unix the file is restricted to mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.config_dir)?;

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
            }),
            news: Some(NewsApiConfig {
                api_key: String::new(),
            }),
            image_worker: Some(ImageWorkerConfig {
                endpoint: String::new(),
                api_key: String::new(),
            }),
            linkedin: Some(LinkedInConfig {
                proxy_url: String::new(),
                access_token: String::new(),
                author_urn: String::new(),
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_config_dir() {
        let paths = PostPilotPaths::with_base("/tmp/pp");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/pp/config.toml"));
        assert_eq!(paths.secret_file(), PathBuf::from("/tmp/pp/secret.json"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = PostPilotPaths::with_base(dir.path().join("nested"));

        let path = paths.ensure_secret_file().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: SecretConfig = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.linkedin.unwrap().author_urn, "");

        std::fs::write(&path, "{}").unwrap();
        paths.ensure_secret_file().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
