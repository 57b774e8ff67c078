//! Configuration for credential resolution

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::auth;

/// Runtime settings for the credential resolver and the AWS CLI wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Directory holding `config`, `credentials` and `sso/cache`
    pub aws_config_dir: PathBuf,
    /// AWS CLI executable
    pub aws_cli: String,
    /// Interactive static-key setup attempts before giving up
    pub max_configure_attempts: u32,
    /// Bound on non-interactive CLI calls
    pub command_timeout: Duration,
    /// Bound on interactive CLI calls; `None` waits indefinitely
    pub login_timeout: Option<Duration>,
    /// Region override for the S3 client
    pub region: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            aws_config_dir: PathBuf::from(auth::AWS_CONFIG_DIR),
            aws_cli: auth::AWS_CLI.to_string(),
            max_configure_attempts: auth::MAX_CONFIGURE_ATTEMPTS,
            command_timeout: auth::COMMAND_TIMEOUT,
            login_timeout: Some(auth::LOGIN_TIMEOUT),
            region: None,
        }
    }
}

impl AuthConfig {
    /// Use a different credential store directory
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.aws_config_dir = dir.into();
        self
    }

    /// Set the number of interactive configuration attempts
    pub fn with_max_configure_attempts(mut self, attempts: u32) -> Self {
        self.max_configure_attempts = attempts;
        self
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.aws_config_dir.join(auth::CREDENTIALS_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.aws_config_dir.join(auth::CONFIG_FILE)
    }

    pub fn sso_cache_dir(&self) -> PathBuf {
        self.aws_config_dir.join(auth::SSO_CACHE_DIR)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_configure_attempts == 0 {
            return Err("At least one configuration attempt is required".to_string());
        }

        if self.command_timeout.is_zero() {
            return Err("Command timeout cannot be zero".to_string());
        }

        if self.aws_cli.trim().is_empty() {
            return Err("AWS CLI executable cannot be empty".to_string());
        }

        Ok(())
    }
}
