//! Core extraction logic
//!
//! This module contains the storage locator parser, the object store
//! abstraction and its S3 implementation, the bounded download pool, zip
//! archiving, and the orchestrator that strings them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bucket_extractor::app::{ExtractionConfig, Extractor, S3Store};
//! use bucket_extractor::auth::{AuthConfig, Session};
//! use bucket_extractor::cli::StdConsole;
//!
//! # async fn example(session: Session) -> Result<(), Box<dyn std::error::Error>> {
//! let store = S3Store::connect(&session, &AuthConfig::default()).await?;
//! let extractor = Extractor::new(Arc::new(store), ExtractionConfig::default());
//!
//! let outcome = extractor.run_once(&mut StdConsole::new()).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod locator;
pub mod orchestrator;
pub mod pool;
pub mod store;

// Re-export main public API
pub use archive::{archive_bucket, archive_path, pack_directory};
pub use config::ExtractionConfig;
pub use locator::StorageLocator;
pub use orchestrator::{ExtractionOutcome, ExtractionSummary, Extractor};
pub use pool::{plan_tasks, DownloadPool, DownloadTask, PoolConfig, PoolReport};
pub use store::{ObjectStore, S3Store};
