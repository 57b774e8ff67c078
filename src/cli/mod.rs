//! Command-line interface components
//!
//! This module contains argument parsing, the console prompts, progress
//! display, interrupt handling and the interactive command loop.

pub mod args;
pub mod commands;
pub mod console;
pub mod progress;
pub mod signals;

pub use args::{Cli, GlobalArgs};
pub use commands::{run_extractor, run_loop};
pub use console::{
    confirm, prompt_locator, prompt_optional, prompt_worker_count, Console, ScriptedConsole,
    StdConsole,
};
pub use progress::{ProgressConfig, ProgressTracker};
pub use signals::wait_for_interrupt;
