//! Configuration management for the bucket extractor
//!
//! Settings come from an optional TOML file with `[auth]`, `[extraction]` and
//! `[logging]` sections, then a handful of environment overrides. Everything
//! has a default, so running without any file works.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::ExtractionConfig;
use crate::auth::AuthConfig;
use crate::constants::{auth, config, env, extraction};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Credential resolution settings
    pub auth: AuthConfigToml,
    /// Extraction and download settings
    pub extraction: ExtractionConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfigToml {
    /// Local credential store directory
    pub aws_config_dir: PathBuf,
    /// AWS CLI executable
    pub aws_cli: String,
    /// Interactive static-key setup attempts
    pub max_configure_attempts: u32,
    /// Timeout for non-interactive CLI calls in seconds
    pub command_timeout_secs: u64,
    /// Timeout for interactive CLI calls in seconds (0 = none)
    pub login_timeout_secs: u64,
    /// Region override for S3 access
    pub region: Option<String>,
}

impl Default for AuthConfigToml {
    fn default() -> Self {
        Self {
            aws_config_dir: PathBuf::from(auth::AWS_CONFIG_DIR),
            aws_cli: auth::AWS_CLI.to_string(),
            max_configure_attempts: auth::MAX_CONFIGURE_ATTEMPTS,
            command_timeout_secs: auth::COMMAND_TIMEOUT.as_secs(),
            login_timeout_secs: auth::LOGIN_TIMEOUT.as_secs(),
            region: None,
        }
    }
}

/// TOML-friendly extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfigToml {
    /// Root directory for extracted buckets
    pub output_dir: PathBuf,
    /// Worker count used when the prompt is left blank
    pub default_max_workers: usize,
    /// Skip files that already exist locally
    pub skip_existing: bool,
    /// Per-transfer timeout in seconds
    pub download_timeout_secs: u64,
    /// Draw a progress bar when attached to a terminal
    pub enable_progress_bar: bool,
}

impl Default for ExtractionConfigToml {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(extraction::OUTPUT_DIR),
            default_max_workers: extraction::DEFAULT_MAX_WORKERS,
            skip_existing: true,
            download_timeout_secs: extraction::DOWNLOAD_TIMEOUT.as_secs(),
            enable_progress_bar: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: config::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> ConfigResult<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.level.clone(),
                reason: "Expected one of error, warn, info, debug, trace".to_string(),
            })
    }
}

impl AppConfig {
    /// Convert to the runtime configuration structures
    pub fn to_runtime_config(&self) -> (AuthConfig, ExtractionConfig) {
        (
            self.auth.to_runtime_config(),
            self.extraction.to_runtime_config(),
        )
    }

    /// Load configuration with fallback to defaults
    ///
    /// An explicit `config_file_override` must exist. Without one the local
    /// file and then the per-user file are tried. Environment overrides are
    /// applied last and the result is validated.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::NotFound { path }),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Look for a configuration file in the default locations
    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(config::LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        Self::get_default_config_path().filter(|path| path.is_file())
    }

    /// Per-user configuration path
    pub fn get_default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(config::APP_CONFIG_DIR).join(config::APP_CONFIG_FILE))
    }

    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply `BUCKET_EXTRACTOR_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(env::CONFIG_DIR_OVERRIDE) {
            debug!("{} overrides aws_config_dir", env::CONFIG_DIR_OVERRIDE);
            self.auth.aws_config_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup(env::OUTPUT_DIR_OVERRIDE) {
            debug!("{} overrides output_dir", env::OUTPUT_DIR_OVERRIDE);
            self.extraction.output_dir = PathBuf::from(dir);
        }

        if let Some(workers) = lookup(env::MAX_WORKERS_OVERRIDE) {
            self.extraction.default_max_workers =
                workers
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: env::MAX_WORKERS_OVERRIDE.to_string(),
                        value: workers.clone(),
                        reason: "Expected a positive whole number".to_string(),
                    })?;
        }

        Ok(())
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let (auth_config, extraction_config) = self.to_runtime_config();

        auth_config
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "auth".to_string(),
                value: format!("{:?}", self.auth),
                reason,
            })?;

        extraction_config
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "extraction".to_string(),
                value: format!("{:?}", self.extraction),
                reason,
            })?;

        self.logging.tracing_level()?;
        Ok(())
    }
}

impl AuthConfigToml {
    /// Convert to runtime configuration
    pub fn to_runtime_config(&self) -> AuthConfig {
        AuthConfig {
            aws_config_dir: self.aws_config_dir.clone(),
            aws_cli: self.aws_cli.clone(),
            max_configure_attempts: self.max_configure_attempts,
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            login_timeout: (self.login_timeout_secs > 0)
                .then(|| Duration::from_secs(self.login_timeout_secs)),
            region: self.region.clone(),
        }
    }
}

impl ExtractionConfigToml {
    /// Convert to runtime configuration
    pub fn to_runtime_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            output_dir: self.output_dir.clone(),
            default_max_workers: self.default_max_workers,
            skip_existing: self.skip_existing,
            download_timeout: Duration::from_secs(self.download_timeout_secs),
            enable_progress_bar: self.enable_progress_bar,
        }
    }
}
