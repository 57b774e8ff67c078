//! Application constants for Bucket Extractor
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Points the AWS CLI and SDK at the local config file
    pub const AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";

    /// Points the AWS CLI and SDK at the local credentials file
    pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

    /// Overrides `[auth] aws_config_dir`
    pub const CONFIG_DIR_OVERRIDE: &str = "BUCKET_EXTRACTOR_AWS_CONFIG_DIR";

    /// Overrides `[extraction] output_dir`
    pub const OUTPUT_DIR_OVERRIDE: &str = "BUCKET_EXTRACTOR_OUTPUT_DIR";

    /// Overrides `[extraction] default_max_workers`
    pub const MAX_WORKERS_OVERRIDE: &str = "BUCKET_EXTRACTOR_MAX_WORKERS";
}

/// Authentication and credential-store constants
pub mod auth {
    use super::Duration;

    /// Local directory that mirrors `~/.aws`
    pub const AWS_CONFIG_DIR: &str = "./aws-config";

    /// Static-key credentials file name inside the config directory
    pub const CREDENTIALS_FILE: &str = "credentials";

    /// CLI config file name inside the config directory
    pub const CONFIG_FILE: &str = "config";

    /// SSO token cache location relative to the config directory
    pub const SSO_CACHE_DIR: &str = "sso/cache";

    /// Expiry timestamp layout written by the CLI into SSO cache entries
    pub const SSO_EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    /// Profile used when none is supplied
    pub const DEFAULT_PROFILE: &str = "default";

    /// Name of the external CLI binary
    pub const AWS_CLI: &str = "aws";

    /// Interactive `aws configure` attempts before giving up
    pub const MAX_CONFIGURE_ATTEMPTS: u32 = 3;

    /// Bound on non-interactive CLI calls (configuration checks, whoami)
    pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

    /// Bound on interactive CLI calls (configure, sso login)
    pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(600);
}

/// Extraction and download constants
pub mod extraction {
    use super::Duration;

    /// Base directory all extractions land in
    pub const OUTPUT_DIR: &str = "Extractions";

    /// Default cap on concurrent transfers
    pub const DEFAULT_MAX_WORKERS: usize = 100;

    /// Largest worker count accepted from the prompt or configuration
    pub const MAX_WORKERS: usize = 1024;

    /// Per-object transfer timeout
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

    /// Suffix for in-flight downloads before the atomic rename
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// Wildcard marker stripped from the end of a prefix
    pub const WILDCARD: char = '*';

    /// Archive file extension
    pub const ARCHIVE_EXTENSION: &str = "zip";
}

/// Console prompt texts
pub mod prompts {
    /// Credential mode choice
    pub const USE_SSO: &str = "\nWould you like to authenticate with AWS SSO? [Y/N] -> ";

    /// Profile name
    pub const PROFILE: &str = "\nEnter AWS profile name (leave blank for 'default') -> ";

    /// Reconfiguration of existing static keys
    pub const RECONFIGURE: &str =
        "\nWould you like to logout and re-setup your configuration? [Y/N] -> ";

    /// Storage locator
    pub const LOCATOR: &str = "\nEnter s3 URI (ex: s3://bucket_name/subfolder) -> ";

    /// Archive confirmation
    pub const ARCHIVE: &str =
        "\nWould you also like to compress the bucket contents to a zip file? [Y/N] -> ";
}

/// Progress reporting
pub mod progress {
    /// Progress bar template, modelled on a 100-column download bar
    pub const BAR_TEMPLATE: &str =
        "{msg} {percent:>3}%|{bar:50.cyan/blue}| [{elapsed_precise}<{eta_precise}]";

    /// Label shown beside the bar
    pub const BAR_LABEL: &str = "Download Progress";

    /// Half-units credited per task (submission and completion)
    pub const UNITS_PER_TASK: u64 = 2;
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "./bucket-extractor.toml";

    /// Directory name under the user config directory
    pub const APP_CONFIG_DIR: &str = "bucket-extractor";

    /// File name under the user config directory
    pub const APP_CONFIG_FILE: &str = "config.toml";

    /// Default log level when no verbosity flag is given
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use auth::{DEFAULT_PROFILE, MAX_CONFIGURE_ATTEMPTS};
pub use extraction::{DEFAULT_MAX_WORKERS, OUTPUT_DIR};
