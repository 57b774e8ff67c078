//! Download progress display
//!
//! [`ProgressTracker`] counts progress in half-units: every task advances the
//! counter once when it is handed to the pool and once when it finishes
//! (downloaded, skipped or failed alike), so a batch of N tasks always ends
//! at exactly 2N half-units, i.e. N whole units. When stderr is a terminal
//! the counter drives an indicatif bar; otherwise the bar is hidden and a
//! summary line is logged at the end.
//!
//! # Examples
//!
//! ```rust
//! use bucket_extractor::cli::{ProgressConfig, ProgressTracker};
//!
//! let tracker = ProgressTracker::new(2, &ProgressConfig::disabled());
//! for _ in 0..2 {
//!     tracker.task_submitted();
//!     tracker.task_finished();
//! }
//! tracker.finish();
//! assert_eq!(tracker.whole_units(), 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::constants::progress;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable the visual progress bar
    pub enable_progress_bar: bool,
    /// Whether stderr is attached to a terminal
    pub is_terminal: bool,
}

impl ProgressConfig {
    /// Detect the terminal and honour the user's preference
    pub fn detect(enable_progress_bar: bool) -> Self {
        Self {
            enable_progress_bar,
            is_terminal: atty::is(atty::Stream::Stderr),
        }
    }

    /// Never draw a bar
    pub fn disabled() -> Self {
        Self {
            enable_progress_bar: false,
            is_terminal: false,
        }
    }

    pub fn shows_bar(&self) -> bool {
        self.enable_progress_bar && self.is_terminal
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self::detect(true)
    }
}

#[derive(Debug)]
struct TrackerState {
    bar: ProgressBar,
    visible: bool,
    total_tasks: u64,
    units: AtomicU64,
    completed: AtomicU64,
}

/// Shared, thread-safe progress counter for one download batch
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: Arc<TrackerState>,
}

impl ProgressTracker {
    /// Create a tracker for `total_tasks` tasks
    pub fn new(total_tasks: usize, config: &ProgressConfig) -> Self {
        let total_tasks = total_tasks as u64;
        let total_units = total_tasks * progress::UNITS_PER_TASK;
        let visible = config.shows_bar();

        let bar = if visible {
            let bar = ProgressBar::new(total_units);
            bar.set_style(
                ProgressStyle::with_template(progress::BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏ "),
            );
            bar.set_message(progress::BAR_LABEL);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            state: Arc::new(TrackerState {
                bar,
                visible,
                total_tasks,
                units: AtomicU64::new(0),
                completed: AtomicU64::new(0),
            }),
        }
    }

    /// A task has been handed to the pool
    pub fn task_submitted(&self) {
        self.advance();
    }

    /// A task has finished, whatever its result
    pub fn task_finished(&self) {
        self.state.completed.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    fn advance(&self) {
        self.state.units.fetch_add(1, Ordering::SeqCst);
        self.state.bar.inc(1);
    }

    /// Half-units recorded so far
    pub fn units(&self) -> u64 {
        self.state.units.load(Ordering::SeqCst)
    }

    /// Whole units recorded so far (one per task at the end of a batch)
    pub fn whole_units(&self) -> u64 {
        self.units() / progress::UNITS_PER_TASK
    }

    pub fn total_units(&self) -> u64 {
        self.state.total_tasks * progress::UNITS_PER_TASK
    }

    pub fn completed_tasks(&self) -> u64 {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Close the bar, or log a summary when no bar was drawn
    pub fn finish(&self) {
        if self.state.visible {
            self.state.bar.finish();
        } else {
            info!(
                "{}: {}/{} tasks finished",
                progress::BAR_LABEL,
                self.completed_tasks(),
                self.state.total_tasks
            );
        }
    }
}
