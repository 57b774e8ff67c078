//! Bucket Extractor Library
//!
//! Interactive extraction of S3 bucket contents to local disk. Credentials
//! come from an SSO login or static keys managed through the AWS CLI; objects
//! are downloaded with a bounded pool of concurrent transfers and can be
//! bundled into a zip archive afterwards.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
