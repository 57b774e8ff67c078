//! Credential resolution for AWS access
//!
//! This module decides which authentication mode to use, makes sure a usable
//! profile exists (configuring one interactively through the AWS CLI when it
//! does not), and verifies the resulting identity before handing back a
//! [`Session`].

use tracing::{debug, info, warn};

use super::config::AuthConfig;
use super::session::{AuthMode, Session};
use super::sso::is_sso_session_valid;
use super::tool::{credentials_file_exists, CredentialTool};
use crate::cli::console::{confirm, prompt_optional, Console};
use crate::constants::{auth, prompts};
use crate::errors::{AuthError, AuthResult};

/// Authentication status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    /// Whether the static-key credentials file exists
    pub credentials_file_exists: bool,
    /// Whether the SSO cache holds an unexpired login
    pub sso_session_valid: bool,
    /// Whether an identity has been verified (None = not tested)
    pub identity_verified: Option<bool>,
}

impl AuthStatus {
    /// Whether any cached credential material is present
    pub fn has_credentials(&self) -> bool {
        self.credentials_file_exists || self.sso_session_valid
    }

    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        match (self.has_credentials(), self.identity_verified) {
            (false, _) => "No cached credentials - configuration required".to_string(),
            (true, None) => format!(
                "Cached credentials found (static keys: {}, SSO session: {}) but not verified",
                yes_no(self.credentials_file_exists),
                yes_no(self.sso_session_valid)
            ),
            (true, Some(true)) => "Credentials verified".to_string(),
            (true, Some(false)) => "Cached credentials failed verification".to_string(),
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Check the local credential store
pub fn get_auth_status(config: &AuthConfig) -> AuthStatus {
    AuthStatus {
        credentials_file_exists: credentials_file_exists(&config.credentials_file()),
        sso_session_valid: is_sso_session_valid(&config.sso_cache_dir()),
        identity_verified: None,
    }
}

/// Resolves a verified [`Session`] from cached state and user input
#[derive(Debug)]
pub struct CredentialResolver<T> {
    tool: T,
    config: AuthConfig,
}

impl<T: CredentialTool> CredentialResolver<T> {
    pub fn new(tool: T, config: AuthConfig) -> Self {
        Self { tool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Run the full resolution procedure once
    ///
    /// `profile` is a profile name supplied up front (e.g. `--profile`).
    ///
    /// # Errors
    ///
    /// `AuthError::ConfigurationExhausted` is fatal. Every other error means
    /// this attempt failed and resolution may be restarted from scratch.
    pub async fn resolve<C: Console + ?Sized>(
        &self,
        console: &mut C,
        profile: Option<&str>,
    ) -> AuthResult<Session> {
        debug!(
            "Credential store {}: {}",
            self.config.aws_config_dir.display(),
            get_auth_status(&self.config).status_message()
        );

        let mode = if confirm(console, prompts::USE_SSO)? {
            AuthMode::Sso
        } else {
            AuthMode::StaticKeys
        };
        info!("Resolving credentials using {}", mode);

        let profile = match mode {
            AuthMode::StaticKeys => {
                self.ensure_static_keys(console, profile).await?
            }
            AuthMode::Sso => {
                let profile = match profile {
                    Some(name) => name.to_string(),
                    None => prompt_optional(console, prompts::PROFILE)?
                        .unwrap_or_else(|| auth::DEFAULT_PROFILE.to_string()),
                };
                self.ensure_sso(console, &profile).await?;
                profile
            }
        };

        self.verify(console, mode, &profile).await
    }

    /// Make sure a static-key profile exists; returns the profile to use
    async fn ensure_static_keys<C: Console + ?Sized>(
        &self,
        console: &mut C,
        supplied: Option<&str>,
    ) -> AuthResult<String> {
        if let Some(name) = supplied {
            if self
                .tool
                .is_profile_configured(name, AuthMode::StaticKeys)
                .await?
            {
                info!("Reusing configured profile '{}'", name);
                console.say(&format!("\nUsing configured profile '{}'", name));
                return Ok(name.to_string());
            }
        }

        let profile = supplied.unwrap_or(auth::DEFAULT_PROFILE);
        let credentials = self.config.credentials_file();

        loop {
            if !credentials_file_exists(&credentials) {
                self.configure_static_keys(console, profile).await?;
                return Ok(profile.to_string());
            }

            console.say("\nCongrats you have pre-configured credentials 🔥👏\n");
            self.tool.show_configuration(profile).await?;

            if !confirm(console, prompts::RECONFIGURE)? {
                return Ok(profile.to_string());
            }

            info!("Removing {} for reconfiguration", credentials.display());
            std::fs::remove_file(&credentials)?;
        }
    }

    /// Run `aws configure` until the credentials file appears
    async fn configure_static_keys<C: Console + ?Sized>(
        &self,
        console: &mut C,
        profile: &str,
    ) -> AuthResult<()> {
        let credentials = self.config.credentials_file();
        let attempts = self.config.max_configure_attempts;

        for attempt in 1..=attempts {
            console.say("\n|-----⚙️  AWS Configuration ⚙️-----|\n");
            let exited_cleanly = self
                .tool
                .run_interactive_configure(AuthMode::StaticKeys, profile)
                .await?;

            if credentials_file_exists(&credentials) {
                info!("Static-key configuration completed on attempt {}", attempt);
                return Ok(());
            }

            warn!(
                "Configuration attempt {}/{} did not produce {} (clean exit: {})",
                attempt,
                attempts,
                credentials.display(),
                exited_cleanly
            );
        }

        Err(AuthError::ConfigurationExhausted { attempts })
    }

    /// Make sure `profile` has a live SSO session
    async fn ensure_sso<C: Console + ?Sized>(
        &self,
        console: &mut C,
        profile: &str,
    ) -> AuthResult<()> {
        let session_valid = is_sso_session_valid(&self.config.sso_cache_dir());
        let configured = self
            .tool
            .is_profile_configured(profile, AuthMode::Sso)
            .await?;
        debug!(
            "SSO profile '{}': configured={}, session_valid={}",
            profile, configured, session_valid
        );

        match (configured, session_valid) {
            (true, true) => {
                info!("Reusing cached SSO session for '{}'", profile);
                console.say(&format!("\nUsing cached SSO session for '{}'", profile));
            }
            (true, false) => {
                console.say(&format!(
                    "\nSSO session for '{}' has expired, starting login...",
                    profile
                ));
                if !self.tool.run_sso_login(profile).await? {
                    return Err(AuthError::LoginFailed {
                        profile: profile.to_string(),
                    });
                }
            }
            (false, _) => {
                console.say(&format!("\nConfiguring SSO profile '{}'...", profile));
                self.tool
                    .run_interactive_configure(AuthMode::Sso, profile)
                    .await?;
                if !self
                    .tool
                    .is_profile_configured(profile, AuthMode::Sso)
                    .await?
                {
                    return Err(AuthError::ProfileNotConfigured {
                        profile: profile.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Confirm the profile works by asking who it belongs to
    async fn verify<C: Console + ?Sized>(
        &self,
        console: &mut C,
        mode: AuthMode,
        profile: &str,
    ) -> AuthResult<Session> {
        let identity = self
            .tool
            .get_caller_identity(profile)
            .await
            .map_err(|e| match e {
                AuthError::IdentityVerification { .. } => e,
                other => AuthError::IdentityVerification {
                    profile: profile.to_string(),
                    reason: other.to_string(),
                },
            })?;

        info!("Authenticated as {} ({})", identity.arn, mode);
        console.say(&format!(
            "\nAuthenticated as {} (account {})",
            identity.arn, identity.account
        ));

        Ok(Session::new(mode, profile, identity))
    }
}
