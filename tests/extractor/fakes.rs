//! Test doubles shared by the integration tests

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bucket_extractor::app::{ExtractionConfig, ObjectStore};
use bucket_extractor::auth::{AuthMode, CallerIdentity, CredentialTool};
use bucket_extractor::errors::{AuthError, AuthResult, DownloadError, DownloadResult};

/// In-memory object store that records how it is used
#[derive(Default)]
pub struct MemoryStore {
    objects: BTreeMap<(String, String), Vec<u8>>,
    failing: HashSet<String>,
    delay: Duration,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub downloads: AtomicUsize,
    pub listings: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, body: &str) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body.as_bytes().to_vec());
        self
    }

    pub fn with_failing_key(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> DownloadResult<Vec<String>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .keys()
            .filter(|(b, key)| b == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn download(&self, bucket: &str, key: &str, destination: &Path) -> DownloadResult<u64> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.downloads.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if self.failing.contains(key) {
            Err(DownloadError::Sdk {
                operation: "GetObject".to_string(),
                message: format!("AccessDenied for {}", key),
            })
        } else {
            match self.objects.get(&(bucket.to_string(), key.to_string())) {
                Some(body) => tokio::fs::write(destination, body)
                    .await
                    .map(|_| body.len() as u64)
                    .map_err(DownloadError::from),
                None => Err(DownloadError::Sdk {
                    operation: "GetObject".to_string(),
                    message: format!("NoSuchKey {}", key),
                }),
            }
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// The report bucket used across the extraction tests
pub fn reports_store() -> MemoryStore {
    MemoryStore::new()
        .with_object("my-bucket", "reports/a.csv", "id,value\n1,10\n")
        .with_object("my-bucket", "reports/b.csv", "id,value\n2,20\n")
        .with_object("my-bucket", "reports/sub/c.csv", "id,value\n3,30\n")
        .with_object("my-bucket", "other/ignored.csv", "nope\n")
}

pub fn extraction_config(output_dir: &Path) -> ExtractionConfig {
    ExtractionConfig::default()
        .with_output_dir(output_dir)
        .with_progress_bar(false)
}

pub fn identity() -> CallerIdentity {
    CallerIdentity {
        user_id: "AIDATEST".to_string(),
        account: "123456789012".to_string(),
        arn: "arn:aws:iam::123456789012:user/tester".to_string(),
    }
}

/// Scripted stand-in for the AWS CLI
pub struct ScriptedTool {
    /// Profile reported as configured for static keys
    pub static_profile: Option<String>,
    /// Whether SSO profiles are configured; flipped by a configure run
    pub sso_configured: Mutex<bool>,
    /// Whether `aws configure sso` makes the profile configured
    pub sso_configure_works: bool,
    pub login_succeeds: bool,
    /// Write this credentials file on the given static configure attempt
    pub credentials_on_attempt: Option<(usize, PathBuf)>,
    pub identity: Option<CallerIdentity>,
    pub configure_attempts: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl Default for ScriptedTool {
    fn default() -> Self {
        Self {
            static_profile: None,
            sso_configured: Mutex::new(false),
            sso_configure_works: true,
            login_succeeds: true,
            credentials_on_attempt: None,
            identity: Some(identity()),
            configure_attempts: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedTool {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CredentialTool for ScriptedTool {
    async fn is_profile_configured(&self, profile: &str, mode: AuthMode) -> AuthResult<bool> {
        self.record(format!("check {} {}", mode, profile));
        Ok(match mode {
            AuthMode::StaticKeys => self.static_profile.as_deref() == Some(profile),
            AuthMode::Sso => *self.sso_configured.lock().unwrap(),
        })
    }

    async fn run_interactive_configure(&self, mode: AuthMode, profile: &str) -> AuthResult<bool> {
        match mode {
            AuthMode::StaticKeys => {
                self.record(format!("configure {}", profile));
                let attempt = self.configure_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some((on_attempt, path)) = &self.credentials_on_attempt {
                    if attempt >= *on_attempt {
                        std::fs::write(path, "[default]\naws_access_key_id = AKIATEST\n")?;
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            AuthMode::Sso => {
                self.record(format!("configure sso {}", profile));
                if self.sso_configure_works {
                    *self.sso_configured.lock().unwrap() = true;
                }
                Ok(self.sso_configure_works)
            }
        }
    }

    async fn run_sso_login(&self, profile: &str) -> AuthResult<bool> {
        self.record(format!("sso login {}", profile));
        Ok(self.login_succeeds)
    }

    async fn show_configuration(&self, profile: &str) -> AuthResult<()> {
        self.record(format!("show {}", profile));
        Ok(())
    }

    async fn get_caller_identity(&self, profile: &str) -> AuthResult<CallerIdentity> {
        self.record(format!("identity {}", profile));
        self.identity
            .clone()
            .ok_or_else(|| AuthError::IdentityVerification {
                profile: profile.to_string(),
                reason: "ExpiredToken".to_string(),
            })
    }
}
