//! Error types for Bucket Extractor
//!
//! This module defines the error types for every component of the application.
//! Errors are designed to be actionable and give the user a clear next step,
//! since almost every failure here ends up printed at an interactive prompt.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Credential resolution and identity verification errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Interactive static-key setup never produced a credentials file
    #[error("AWS configuration failed after {attempts} attempts")]
    ConfigurationExhausted { attempts: u32 },

    /// `aws sso login` exited unsuccessfully
    #[error("SSO login failed for profile '{profile}'. Please try logging in again")]
    LoginFailed { profile: String },

    /// SSO configuration finished but the profile is still unknown to the CLI
    #[error("Profile '{profile}' is not configured. Please re-run the SSO configuration")]
    ProfileNotConfigured { profile: String },

    /// Caller identity lookup failed or returned something unparseable
    #[error("Unable to verify identity for profile '{profile}': {reason}. Please login again")]
    IdentityVerification { profile: String, reason: String },

    /// The external CLI could not be started
    #[error("Failed to run '{command}'. Is the AWS CLI installed and on PATH?")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The external CLI did not finish in time
    #[error("'{command}' timed out after {seconds} seconds")]
    CommandTimeout { command: String, seconds: u64 },

    /// File I/O error around the local credential store or the console
    #[error("Credential store I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AuthError {
    /// Whether the whole program must stop rather than retry resolution
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::ConfigurationExhausted { .. })
    }
}

/// Storage locator parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Nothing was entered
    #[error("s3 URI is required")]
    Empty,

    /// No `/` between bucket and prefix
    #[error("Missing '/' between bucket and prefix in '{input}'")]
    MissingSeparator { input: String },

    /// Bucket segment is empty
    #[error("Bucket name is empty in '{input}'")]
    EmptyBucket { input: String },
}

/// Listing and transfer errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Error returned by the S3 SDK
    #[error("S3 {operation} failed: {message}")]
    Sdk { operation: String, message: String },

    /// The SDK session could not be opened from the profile
    #[error("Failed to open S3 session for profile '{profile}': {message}")]
    Session { profile: String, message: String },

    /// A single transfer exceeded its time budget
    #[error("Download of '{key}' timed out after {seconds} seconds")]
    Timeout { key: String, seconds: u64 },

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] io::Error),

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// A download task panicked or was cancelled
    #[error("Download task for '{key}' did not complete: {reason}")]
    TaskPanicked { key: String, reason: String },

    /// One or more transfers in a batch failed
    #[error("{failed} of {total} downloads failed (first failure: {first})")]
    BatchFailed {
        failed: usize,
        total: usize,
        first: String,
    },
}

/// Archive creation errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Nothing to archive
    #[error("Archive source directory not found: {path}")]
    SourceMissing { path: PathBuf },

    /// Zip writer failure
    #[error("Zip archive error")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failure
    #[error("Failed to walk archive source")]
    Walk(#[from] walkdir::Error),

    /// File I/O error
    #[error("Archive I/O error")]
    Io(#[from] io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Locator parse error
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Archive error
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Errors that must terminate the process instead of restarting the loop
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Auth(e) => e.is_fatal(),
            AppError::Config(_) => true,
            _ => false,
        }
    }

    /// Standard input reached end-of-file; treated like an interrupt
    pub fn is_input_closed(&self) -> bool {
        let io_error = match self {
            AppError::Io(e) | AppError::Auth(AuthError::Io(e)) => e,
            _ => return false,
        };
        io_error.kind() == io::ErrorKind::UnexpectedEof
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Locator(_) => "locator",
            AppError::Download(_) => "download",
            AppError::Archive(_) => "archive",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Archive result type alias
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
