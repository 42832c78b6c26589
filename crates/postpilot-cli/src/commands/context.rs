use std::sync::Arc;

use anyhow::{Context, Result};
use postpilot_application::ContentWorkflow;
use postpilot_core::CancellationToken;
use postpilot_core::config::{AppConfig, SecretConfig};
use postpilot_core::secret::SecretService;
use postpilot_infrastructure::{ConfigService, PostPilotPaths, ReqwestTransport, SecretServiceImpl};
use tokio::task::JoinHandle;

/// Everything a command needs, loaded once at start-up.
pub struct AppContext {
    pub paths: PostPilotPaths,
    pub config: AppConfig,
    pub secrets: SecretConfig,
}

impl AppContext {
    pub async fn load() -> Result<Self> {
        let paths = PostPilotPaths::resolve().context("Failed to resolve config directory")?;
        let config = ConfigService::new(&paths)
            .load()
            .with_context(|| format!("Failed to load {}", paths.config_file().display()))?;
        let secrets = SecretServiceImpl::new(&paths)
            .load_secrets()
            .await
            .with_context(|| format!("Failed to load {}", paths.secret_file().display()))?;
        tracing::debug!(config_dir = %paths.config_dir().display(), mode = %config.ideas.mode, "configuration loaded");
        Ok(Self {
            paths,
            config,
            secrets,
        })
    }

    /// Builds the workflow without a Ctrl-C hook.
    pub fn build_workflow(&self) -> Result<ContentWorkflow> {
        let transport = Arc::new(ReqwestTransport::new()?);
        ContentWorkflow::from_config(transport, &self.config, &self.secrets)
            .context("Run `postpilot config --init` and fill in secret.json, or set POSTPILOT_* variables")
    }

    /// Builds the workflow; Ctrl-C cancels whatever call is in flight.
    pub fn workflow(&self) -> Result<ContentWorkflow> {
        let (cancel, _watcher) = cancel_on_ctrl_c();
        Ok(self.build_workflow()?.with_cancellation(cancel))
    }
}

/// A token that the next Ctrl-C cancels. Abort the handle to stop watching.
pub fn cancel_on_ctrl_c() -> (CancellationToken, JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });
    (cancel, watcher)
}
