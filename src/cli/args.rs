//! Command-line argument parsing for the bucket extractor
//!
//! The workflow itself is interactive; flags only tune logging, point at a
//! configuration file and optionally pre-select an AWS profile.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Bucket Extractor - copy S3 prefixes to local disk
#[derive(Parser, Debug)]
#[command(
    name = "bucket_extractor",
    version,
    about = "Interactively download S3 bucket contents to local disk",
    long_about = "Authenticates with AWS through SSO or static keys, then repeatedly asks for an s3 URI
and downloads every object under it with a bounded pool of concurrent workers, optionally
compressing the result into a zip archive."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// AWS profile to use instead of asking
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level, falling back to `configured` when no flag is set
    pub fn log_level(&self, configured: tracing::Level) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            configured
        }
    }

    /// Profile given on the command line, if any non-blank one was
    pub fn profile(&self) -> Option<&str> {
        self.global
            .profile
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
