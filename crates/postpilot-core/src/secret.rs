//! Secret management service trait.
//!
//! Defines the interface for loading API keys and access tokens.

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secrets are never logged or exposed in error messages
/// - Secrets are read from a location outside any distributed artifact
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// Error messages name missing keys, never their values.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the backing secret file exists.
    async fn secret_file_exists(&self) -> bool;
}
