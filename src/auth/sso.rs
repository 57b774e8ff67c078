//! SSO token cache inspection
//!
//! The AWS CLI drops one JSON file per SSO login into `sso/cache`. Only
//! entries carrying both `startUrl` and `expiresAt` are login tokens; the
//! rest (client registrations and the like) are ignored.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::constants::auth;

/// The fields of a cache entry this tool cares about
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoCacheEntry {
    pub start_url: Option<String>,
    pub expires_at: Option<String>,
}

impl SsoCacheEntry {
    /// Expiry of a login-token entry, if this is one and it parses
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.start_url.as_ref()?;
        parse_expiry(self.expires_at.as_deref()?)
    }

    /// Whether the token is still usable at `now` (strictly before expiry)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry().is_some_and(|expiry| expiry > now)
    }
}

/// Parse an `expiresAt` value as UTC
///
/// The CLI writes `YYYY-MM-DDTHH:MM:SSZ`; full RFC 3339 is also accepted.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, auth::SSO_EXPIRY_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

/// Whether the cache directory holds an unexpired SSO login
pub fn is_sso_session_valid(cache_dir: &Path) -> bool {
    is_sso_session_valid_at(cache_dir, Utc::now())
}

/// [`is_sso_session_valid`] against an explicit clock
pub fn is_sso_session_valid_at(cache_dir: &Path, now: DateTime<Utc>) -> bool {
    let entries = match std::fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No SSO cache at {}: {}", cache_dir.display(), e);
            return false;
        }
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| read_entry(&path))
        .any(|entry| entry.is_valid_at(now))
}

fn read_entry(path: &Path) -> Option<SsoCacheEntry> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| debug!("Skipping unreadable SSO cache entry {}: {}", path.display(), e))
        .ok()?;
    serde_json::from_str(&content)
        .map_err(|e| debug!("Skipping malformed SSO cache entry {}: {}", path.display(), e))
        .ok()
}
