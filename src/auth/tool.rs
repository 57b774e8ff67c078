//! AWS CLI wrapper
//!
//! Credential workflows (interactive key setup, SSO device-code login,
//! whoami) belong to the AWS CLI. [`CredentialTool`] is the narrow surface
//! the resolver needs from it; [`AwsCli`] implements it by spawning the
//! `aws` binary against the local credential store.

use std::path::Path;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::config::AuthConfig;
use super::session::{AuthMode, CallerIdentity};
use crate::constants::env;
use crate::errors::{AuthError, AuthResult};

/// Operations the credential resolver delegates to the external CLI
#[async_trait]
pub trait CredentialTool: Send + Sync {
    /// Whether `profile` is configured for `mode`
    async fn is_profile_configured(&self, profile: &str, mode: AuthMode) -> AuthResult<bool>;

    /// Run the interactive configuration for `mode`; `true` if it exited cleanly
    async fn run_interactive_configure(&self, mode: AuthMode, profile: &str) -> AuthResult<bool>;

    /// Run the interactive SSO login; `true` if it exited cleanly
    async fn run_sso_login(&self, profile: &str) -> AuthResult<bool>;

    /// Print the current configuration for `profile` to the terminal
    async fn show_configuration(&self, profile: &str) -> AuthResult<()>;

    /// Look up the identity behind `profile`
    async fn get_caller_identity(&self, profile: &str) -> AuthResult<CallerIdentity>;
}

/// [`CredentialTool`] backed by the `aws` executable
#[derive(Debug, Clone)]
pub struct AwsCli {
    config: AuthConfig,
}

impl AwsCli {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.config.aws_cli);
        command
            .args(args)
            .env(env::AWS_CONFIG_FILE, self.config.config_file())
            .env(
                env::AWS_SHARED_CREDENTIALS_FILE,
                self.config.credentials_file(),
            )
            .kill_on_drop(true);
        command
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.config.aws_cli, args.join(" "))
    }

    /// Run a non-interactive command and capture its output
    async fn capture(&self, args: &[&str]) -> AuthResult<Output> {
        let description = self.describe(args);
        debug!("Running {}", description);

        let mut command = self.command(args);
        command.stdin(Stdio::null());

        let output = with_timeout(
            &description,
            Some(self.config.command_timeout),
            command.output(),
        )
        .await?;
        debug!("{} exited with {}", description, output.status);
        Ok(output)
    }

    /// Run a command attached to the user's terminal
    async fn interactive(&self, args: &[&str]) -> AuthResult<ExitStatus> {
        let description = self.describe(args);
        debug!("Running interactive {}", description);

        let mut command = self.command(args);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status =
            with_timeout(&description, self.config.login_timeout, command.status()).await?;
        if !status.success() {
            warn!("{} exited with {}", description, status);
        }
        Ok(status)
    }
}

async fn with_timeout<T>(
    description: &str,
    limit: Option<Duration>,
    future: impl std::future::Future<Output = std::io::Result<T>>,
) -> AuthResult<T> {
    let result = match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
            AuthError::CommandTimeout {
                command: description.to_string(),
                seconds: limit.as_secs(),
            }
        })?,
        None => future.await,
    };

    result.map_err(|source| AuthError::CommandSpawn {
        command: description.to_string(),
        source,
    })
}

#[async_trait]
impl CredentialTool for AwsCli {
    async fn is_profile_configured(&self, profile: &str, mode: AuthMode) -> AuthResult<bool> {
        match mode {
            AuthMode::StaticKeys => {
                let output = self
                    .capture(&["configure", "list", "--profile", profile])
                    .await?;
                Ok(output.status.success()
                    && profile_listed(&String::from_utf8_lossy(&output.stdout), profile))
            }
            AuthMode::Sso => {
                for key in ["sso_start_url", "sso_session"] {
                    let output = self
                        .capture(&["configure", "get", key, "--profile", profile])
                        .await?;
                    if output.status.success()
                        && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
                    {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    async fn run_interactive_configure(&self, mode: AuthMode, profile: &str) -> AuthResult<bool> {
        let status = match mode {
            AuthMode::StaticKeys => self.interactive(&["configure", "--profile", profile]).await?,
            AuthMode::Sso => {
                self.interactive(&["configure", "sso", "--profile", profile])
                    .await?
            }
        };
        Ok(status.success())
    }

    async fn run_sso_login(&self, profile: &str) -> AuthResult<bool> {
        let status = self.interactive(&["sso", "login", "--profile", profile]).await?;
        Ok(status.success())
    }

    async fn show_configuration(&self, profile: &str) -> AuthResult<()> {
        self.interactive(&["configure", "list", "--profile", profile])
            .await?;
        Ok(())
    }

    async fn get_caller_identity(&self, profile: &str) -> AuthResult<CallerIdentity> {
        let output = self
            .capture(&[
                "sts",
                "get-caller-identity",
                "--profile",
                profile,
                "--output",
                "json",
            ])
            .await?;

        if !output.status.success() {
            return Err(AuthError::IdentityVerification {
                profile: profile.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        CallerIdentity::from_json(&String::from_utf8_lossy(&output.stdout)).map_err(|e| {
            AuthError::IdentityVerification {
                profile: profile.to_string(),
                reason: format!("unexpected identity document ({})", e),
            }
        })
    }
}

/// Whether `aws configure list` output has a `profile <name>` row
pub fn profile_listed(listing: &str, profile: &str) -> bool {
    listing.lines().any(|line| {
        let mut fields = line.split_whitespace();
        fields.next() == Some("profile") && fields.next() == Some(profile)
    })
}

/// Whether the static-key credentials file exists
pub fn credentials_file_exists(path: &Path) -> bool {
    path.is_file()
}
