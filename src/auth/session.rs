//! Authenticated session types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::auth;

/// How the session's credentials were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    /// Long-lived access key pair configured with `aws configure`
    StaticKeys,
    /// Federated single sign-on with a cached, time-limited token
    Sso,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::StaticKeys => write!(f, "static keys"),
            AuthMode::Sso => write!(f, "SSO"),
        }
    }
}

/// Identity document returned by `aws sts get-caller-identity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub user_id: String,
    pub account: String,
    pub arn: String,
}

impl CallerIdentity {
    /// Parse the CLI's JSON output
    pub fn from_json(document: &str) -> serde_json::Result<Self> {
        serde_json::from_str(document)
    }
}

/// A verified session, bound to one credential mode and profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    mode: AuthMode,
    profile: String,
    identity: CallerIdentity,
}

impl Session {
    /// Create a session; an empty profile name means the default profile
    pub fn new(mode: AuthMode, profile: impl Into<String>, identity: CallerIdentity) -> Self {
        let profile = profile.into();
        let profile = if profile.trim().is_empty() {
            auth::DEFAULT_PROFILE.to_string()
        } else {
            profile
        };
        Self {
            mode,
            profile,
            identity,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }
}
