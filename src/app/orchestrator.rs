//! Extraction orchestration
//!
//! One iteration asks for a location, lists it, downloads everything under
//! it into `<output>/<bucket>/<prefix>` and optionally zips the bucket
//! directory. The caller decides how often to repeat it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::archive::archive_bucket;
use super::config::ExtractionConfig;
use super::locator::StorageLocator;
use super::pool::{plan_tasks, DownloadPool, PoolConfig, PoolReport};
use super::store::ObjectStore;
use crate::cli::console::{confirm, prompt_locator, prompt_worker_count, Console};
use crate::cli::progress::{ProgressConfig, ProgressTracker};
use crate::constants::prompts;
use crate::errors::{AppError, Result};

/// Result of a completed extraction
#[derive(Debug)]
pub struct ExtractionSummary {
    pub locator: StorageLocator,
    /// Directory the objects were written to
    pub destination: PathBuf,
    pub report: PoolReport,
    /// Archive path, when one was requested
    pub archive: Option<PathBuf>,
}

/// How one iteration ended
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The location matched no objects; nothing was created
    NoObjects { locator: StorageLocator },
    Extracted(ExtractionSummary),
}

/// Drives extraction iterations against one object store
pub struct Extractor {
    store: Arc<dyn ObjectStore>,
    config: ExtractionConfig,
    progress: ProgressConfig,
}

impl Extractor {
    pub fn new(store: Arc<dyn ObjectStore>, config: ExtractionConfig) -> Self {
        let progress = ProgressConfig::detect(config.enable_progress_bar);
        Self {
            store,
            config,
            progress,
        }
    }

    /// Override terminal detection for the progress display
    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Prompt for a location and extract it
    pub async fn run_once<C: Console + ?Sized>(&self, console: &mut C) -> Result<ExtractionOutcome> {
        let locator = prompt_locator(console)?;
        self.run_for(console, locator).await
    }

    /// Extract an already parsed location
    ///
    /// The worker count and archive choice are still asked for on `console`.
    ///
    /// # Errors
    ///
    /// Listing failures, filesystem errors, a batch with any failed transfer
    /// and archive failures all end the iteration with an error. Failed
    /// transfers are only reported after every task has finished.
    pub async fn run_for<C: Console + ?Sized>(
        &self,
        console: &mut C,
        locator: StorageLocator,
    ) -> Result<ExtractionOutcome> {
        let keys = self
            .store
            .list_keys(locator.bucket(), locator.prefix())
            .await?;

        if keys.is_empty() {
            info!("No objects under {}", locator);
            console.say(&format!(
                "\nNo objects found at the given location: {}",
                locator
            ));
            return Ok(ExtractionOutcome::NoObjects { locator });
        }

        let destination = locator.destination(&self.config.output_dir);
        tokio::fs::create_dir_all(&destination).await?;
        debug!("Prepared {}", destination.display());

        let tasks = plan_tasks(&keys, &destination);
        let max_workers = prompt_worker_count(console, self.config.default_max_workers)?;

        console.say(&format!(
            "\nExtracting {} object(s) from {} into {}\n",
            tasks.len(),
            locator,
            destination.display()
        ));

        let progress = ProgressTracker::new(tasks.len(), &self.progress);
        let pool = DownloadPool::new(
            Arc::clone(&self.store),
            PoolConfig::from_extraction(&self.config, max_workers),
        );
        let report = pool.run(locator.bucket(), tasks, &progress).await;
        progress.finish();
        let report = report.into_result()?;

        console.say(&format!(
            "\nDownloaded {} file(s), skipped {} already present",
            report.downloaded, report.skipped
        ));

        let archive = if confirm(console, prompts::ARCHIVE)? {
            let output_dir = self.config.output_dir.clone();
            let bucket = locator.bucket().to_string();
            let path = tokio::task::spawn_blocking(move || archive_bucket(&output_dir, &bucket))
                .await
                .map_err(|e| AppError::generic(format!("Archive task failed: {}", e)))??;
            console.say(&format!("\nCreated archive {}", path.display()));
            Some(path)
        } else {
            None
        };

        Ok(ExtractionOutcome::Extracted(ExtractionSummary {
            locator,
            destination,
            report,
            archive,
        }))
    }
}
