//! Authentication against AWS
//!
//! This module resolves a verified [`Session`] either from long-lived static
//! keys or from an SSO login, delegating the interactive parts to the AWS
//! CLI through the [`CredentialTool`] trait.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bucket_extractor::auth::{AuthConfig, AwsCli, CredentialResolver};
//! use bucket_extractor::cli::StdConsole;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::default();
//! let resolver = CredentialResolver::new(AwsCli::new(config.clone()), config);
//!
//! let session = resolver.resolve(&mut StdConsole::new(), None).await?;
//! println!("Signed in as {}", session.identity().arn);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod session;
pub mod sso;
pub mod tool;

// Re-export main public API
pub use config::AuthConfig;
pub use credentials::{get_auth_status, AuthStatus, CredentialResolver};
pub use session::{AuthMode, CallerIdentity, Session};
pub use sso::{is_sso_session_valid, is_sso_session_valid_at, parse_expiry, SsoCacheEntry};
pub use tool::{profile_listed, AwsCli, CredentialTool};
