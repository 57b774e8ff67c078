//! Prelude module for the Bucket Extractor library
//!
//! Re-exports the items most integrations need, so a single
//! `use bucket_extractor::prelude::*;` covers the common case.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bucket_extractor::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let auth = AuthConfig::default();
//!     let resolver = CredentialResolver::new(AwsCli::new(auth.clone()), auth.clone());
//!     let mut console = StdConsole::new();
//!
//!     let session = resolver.resolve(&mut console, None).await?;
//!     let store = S3Store::connect(&session, &auth).await?;
//!     let extractor = Extractor::new(Arc::new(store), ExtractionConfig::default());
//!     extractor.run_once(&mut console).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Authentication
pub use crate::auth::{AuthConfig, AuthMode, AwsCli, CredentialResolver, CredentialTool, Session};

// Extraction
pub use crate::app::{
    DownloadPool, ExtractionConfig, ExtractionOutcome, Extractor, ObjectStore, PoolConfig,
    PoolReport, S3Store, StorageLocator,
};

// Console and progress
pub use crate::cli::{Console, ProgressConfig, ProgressTracker, ScriptedConsole, StdConsole};

// Configuration
pub use crate::config::AppConfig;
