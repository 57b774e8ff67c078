//! Object store access
//!
//! The orchestrator only needs two operations from the remote store: list
//! every key under a prefix, and copy one object to a local file. They are
//! expressed as the [`ObjectStore`] trait so the download pool can be
//! exercised against an in-memory store; [`S3Store`] is the production
//! implementation on top of the AWS SDK.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_sdk_s3::config::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::auth::{AuthConfig, Session};
use crate::constants::extraction;
use crate::errors::{DownloadError, DownloadResult};

/// Remote object store operations used by the extractor
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key in `bucket` that starts with `prefix`
    async fn list_keys(&self, bucket: &str, prefix: &str) -> DownloadResult<Vec<String>>;

    /// Copy one object to `destination`, returning the number of bytes written
    async fn download(&self, bucket: &str, key: &str, destination: &Path) -> DownloadResult<u64>;
}

/// S3-backed object store bound to one authenticated session
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an already configured SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Open an SDK client for the session's profile
    ///
    /// The profile is read from the local credential store directory so the
    /// SDK sees exactly what the CLI configured. Credentials are resolved
    /// here, so a profile the SDK cannot use fails before any listing.
    pub async fn connect(session: &Session, auth: &AuthConfig) -> DownloadResult<Self> {
        let profile_files = EnvConfigFiles::builder()
            .with_file(EnvConfigFileKind::Config, auth.config_file())
            .with_file(EnvConfigFileKind::Credentials, auth.credentials_file())
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .profile_files(profile_files)
            .profile_name(session.profile());

        if let Some(region) = &auth.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| session_error(session, "no credentials provider could be resolved"))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| session_error(session, DisplayErrorContext(&e)))?;
        debug!("Resolved SDK credentials for profile '{}'", session.profile());

        info!(
            "Opened S3 session for profile '{}' ({})",
            session.profile(),
            session.mode()
        );
        Ok(Self::new(Client::new(&sdk_config)))
    }
}

fn session_error(session: &Session, message: impl std::fmt::Display) -> DownloadError {
    DownloadError::Session {
        profile: session.profile().to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> DownloadResult<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| DownloadError::Sdk {
                operation: "ListObjectsV2".to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        debug!("Listed {} keys under s3://{}/{}", keys.len(), bucket, prefix);
        Ok(keys)
    }

    async fn download(&self, bucket: &str, key: &str, destination: &Path) -> DownloadResult<u64> {
        let mut response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| DownloadError::Sdk {
                operation: "GetObject".to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let temp_path = partial_path(destination);
        let mut file = File::create(&temp_path).await?;
        let mut written = 0_u64;

        let copy_result: DownloadResult<()> = async {
            while let Some(chunk) = response.body.try_next().await.map_err(|e| {
                DownloadError::Sdk {
                    operation: "GetObject body".to_string(),
                    message: e.to_string(),
                }
            })? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = copy_result {
            drop(file);
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
        drop(file);

        tokio::fs::rename(&temp_path, destination)
            .await
            .map_err(|_| DownloadError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.to_path_buf(),
            })?;

        debug!("Downloaded s3://{}/{} ({} bytes)", bucket, key, written);
        Ok(written)
    }
}

/// Temporary path an in-flight download is written to
pub(crate) fn partial_path(destination: &Path) -> std::path::PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(extraction::PARTIAL_FILE_SUFFIX);
    destination.with_file_name(name)
}
