//! Storage locator parsing
//!
//! A locator is the `(bucket, prefix)` pair a user types as
//! `s3://bucket/prefix`. Any `<scheme>://` is accepted and discarded; a
//! trailing `*` wildcard on the prefix is stripped because listing is
//! already prefix-based.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::extraction;
use crate::errors::LocatorError;

/// Parsed bucket and key prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocator {
    bucket: String,
    prefix: String,
}

impl StorageLocator {
    /// Parse a locator of the form `scheme://bucket[/prefix]`
    ///
    /// The `/` after the bucket is required, though the prefix after it may
    /// be empty (`s3://bucket/` selects the whole bucket).
    ///
    /// # Errors
    ///
    /// Returns `LocatorError` if the input is blank, lacks the `/`
    /// separator, or names an empty bucket.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::Empty);
        }

        let without_scheme = match trimmed.find("://") {
            Some(index) => &trimmed[index + 3..],
            None => trimmed,
        };

        let (bucket, prefix) =
            without_scheme
                .split_once('/')
                .ok_or_else(|| LocatorError::MissingSeparator {
                    input: trimmed.to_string(),
                })?;

        if bucket.is_empty() {
            return Err(LocatorError::EmptyBucket {
                input: trimmed.to_string(),
            });
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.trim_end_matches(extraction::WILDCARD).to_string(),
        })
    }

    /// Build a locator directly from its parts
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Local directory this locator's objects are written into
    pub fn destination(&self, base_dir: &Path) -> PathBuf {
        let mut path = base_dir.join(&self.bucket);
        for segment in self.prefix.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}
