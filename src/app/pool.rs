//! Bounded concurrent download pool
//!
//! Every task in a batch is spawned onto the runtime up front and waits on a
//! shared semaphore for one of `max_workers` transfer slots. All tasks are
//! awaited; a failing task never cancels its siblings. Failures are kept in
//! the [`PoolReport`] and only turned into an error once the whole batch is
//! done.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::config::ExtractionConfig;
use super::store::{partial_path, ObjectStore};
use crate::cli::progress::ProgressTracker;
use crate::constants::extraction;
use crate::errors::{DownloadError, DownloadResult};

/// One object to copy to one local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub key: String,
    pub destination: PathBuf,
}

/// Turn listed keys into download tasks for `directory`
///
/// Each file is named after the last segment of its key. Keys ending in `/`
/// (folder markers) or in a `.` / `..` segment are dropped, and when two keys
/// share a file name only the first one listed is kept so no two tasks write
/// the same path.
pub fn plan_tasks<S: AsRef<str>>(keys: &[S], directory: &Path) -> Vec<DownloadTask> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(keys.len());

    for key in keys {
        let key = key.as_ref();
        let name = key.rsplit('/').next().unwrap_or_default();
        if matches!(name, "" | "." | "..") {
            debug!("Skipping folder marker '{}'", key);
            continue;
        }
        if !seen.insert(name.to_string()) {
            warn!(
                "Skipping '{}': another object is already saved as '{}'",
                key, name
            );
            continue;
        }
        tasks.push(DownloadTask {
            key: key.to_string(),
            destination: directory.join(name),
        });
    }

    tasks
}

/// Settings for one pool run
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum transfers in flight at once
    pub max_workers: usize,
    /// Skip tasks whose destination already exists
    pub skip_existing: bool,
    /// Bound on each individual transfer
    pub download_timeout: Duration,
}

impl PoolConfig {
    /// Pool settings from the extraction configuration and a chosen worker count
    pub fn from_extraction(config: &ExtractionConfig, max_workers: usize) -> Self {
        Self {
            max_workers,
            skip_existing: config.skip_existing,
            download_timeout: config.download_timeout,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("Worker count must be greater than 0".to_string());
        }
        if self.max_workers > extraction::MAX_WORKERS {
            return Err(format!(
                "Worker count cannot exceed {}",
                extraction::MAX_WORKERS
            ));
        }
        if self.download_timeout.is_zero() {
            return Err("Download timeout cannot be zero".to_string());
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        let extraction = ExtractionConfig::default();
        Self::from_extraction(&extraction, extraction.default_max_workers)
    }
}

/// What a single task ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Downloaded(u64),
    Skipped,
}

/// Per-batch results
#[derive(Debug, Default)]
pub struct PoolReport {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes: u64,
    pub failures: Vec<(String, DownloadError)>,
}

impl PoolReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse failures into a single batch error
    pub fn into_result(self) -> DownloadResult<Self> {
        match self.failures.first() {
            None => Ok(self),
            Some((key, error)) => Err(DownloadError::BatchFailed {
                failed: self.failures.len(),
                total: self.total,
                first: format!("{}: {}", key, error),
            }),
        }
    }
}

/// Runs download batches against an [`ObjectStore`]
#[derive(Clone)]
pub struct DownloadPool {
    store: Arc<dyn ObjectStore>,
    config: PoolConfig,
}

impl std::fmt::Debug for DownloadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPool")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DownloadPool {
    pub fn new(store: Arc<dyn ObjectStore>, config: PoolConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Download every task from `bucket`, reporting progress as tasks move
    pub async fn run(
        &self,
        bucket: &str,
        tasks: Vec<DownloadTask>,
        progress: &ProgressTracker,
    ) -> PoolReport {
        let total = tasks.len();
        let workers = self
            .config
            .max_workers
            .min(total)
            .clamp(1, Semaphore::MAX_PERMITS);
        info!(
            "Downloading {} objects from '{}' with up to {} workers",
            total, bucket, workers
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut keys = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for task in tasks {
            progress.task_submitted();
            keys.push(task.key.clone());

            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let bucket = bucket.to_string();
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => run_task(store.as_ref(), &bucket, &task, &config).await,
                    Err(e) => Err(DownloadError::TaskPanicked {
                        key: task.key.clone(),
                        reason: e.to_string(),
                    }),
                };
                progress.task_finished();
                outcome
            }));
        }

        let mut report = PoolReport::new(total);
        for (key, result) in keys.into_iter().zip(join_all(handles).await) {
            match result {
                Ok(Ok(TaskOutcome::Downloaded(bytes))) => {
                    report.downloaded += 1;
                    report.bytes += bytes;
                }
                Ok(Ok(TaskOutcome::Skipped)) => report.skipped += 1,
                Ok(Err(e)) => {
                    warn!("Failed to download '{}': {}", key, e);
                    report.failures.push((key, e));
                }
                Err(join_error) => {
                    // The task never reached its own completion call
                    progress.task_finished();
                    warn!("Download task for '{}' aborted: {}", key, join_error);
                    let error = DownloadError::TaskPanicked {
                        key: key.clone(),
                        reason: join_error.to_string(),
                    };
                    report.failures.push((key, error));
                }
            }
        }

        info!(
            "Batch finished: {} downloaded ({} bytes), {} skipped, {} failed",
            report.downloaded,
            report.bytes,
            report.skipped,
            report.failed()
        );
        report
    }
}

async fn run_task(
    store: &dyn ObjectStore,
    bucket: &str,
    task: &DownloadTask,
    config: &PoolConfig,
) -> DownloadResult<TaskOutcome> {
    if config.skip_existing && tokio::fs::try_exists(&task.destination).await? {
        debug!(
            "Skipping '{}': {} already exists",
            task.key,
            task.destination.display()
        );
        return Ok(TaskOutcome::Skipped);
    }

    match tokio::time::timeout(
        config.download_timeout,
        store.download(bucket, &task.key, &task.destination),
    )
    .await
    {
        Ok(result) => result.map(TaskOutcome::Downloaded),
        Err(_) => {
            let _ = tokio::fs::remove_file(partial_path(&task.destination)).await;
            Err(DownloadError::Timeout {
                key: task.key.clone(),
                seconds: config.download_timeout.as_secs(),
            })
        }
    }
}
