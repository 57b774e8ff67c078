//! Extraction configuration
//!
//! Settings that shape one extraction run: where files land, how many
//! transfers may run at once and what happens to files already on disk.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::extraction;

/// Configuration for the extraction orchestrator and its download pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Root directory for extracted buckets
    pub output_dir: PathBuf,
    /// Worker count offered when the user leaves the prompt blank
    pub default_max_workers: usize,
    /// Skip tasks whose destination file already exists
    pub skip_existing: bool,
    /// Timeout for individual transfers
    pub download_timeout: Duration,
    /// Show an indicatif bar when attached to a terminal
    pub enable_progress_bar: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(extraction::OUTPUT_DIR),
            default_max_workers: extraction::DEFAULT_MAX_WORKERS,
            skip_existing: true,
            download_timeout: extraction::DOWNLOAD_TIMEOUT,
            enable_progress_bar: true,
        }
    }
}

impl ExtractionConfig {
    /// Set the output root
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the default worker count
    pub fn with_default_max_workers(mut self, workers: usize) -> Self {
        self.default_max_workers = workers;
        self
    }

    /// Enable or disable skipping of existing files
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Set the per-transfer timeout
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.enable_progress_bar = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_workers == 0 {
            return Err("Default worker count must be greater than 0".to_string());
        }

        if self.default_max_workers > extraction::MAX_WORKERS {
            return Err(format!(
                "Default worker count cannot exceed {}",
                extraction::MAX_WORKERS
            ));
        }

        if self.download_timeout.is_zero() {
            return Err("Download timeout cannot be zero".to_string());
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }

        Ok(())
    }
}
