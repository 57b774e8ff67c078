//! Interactive command loop
//!
//! The program alternates between two loops. The outer one resolves a
//! session and opens the object store; the inner one runs extraction
//! iterations with that store until one fails, at which point the error is
//! reported and the outer loop starts again from authentication.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::args::Cli;
use super::console::{Console, StdConsole};
use crate::app::{ExtractionConfig, ExtractionOutcome, Extractor, ObjectStore, S3Store};
use crate::auth::{AuthConfig, AwsCli, CredentialResolver, CredentialTool, Session};
use crate::config::AppConfig;
use crate::errors::{AppError, DownloadResult, Result};

/// Run the extractor against the terminal until input ends or a fatal error
pub async fn run_extractor(cli: &Cli, config: &AppConfig) -> Result<()> {
    let (auth_config, extraction_config) = config.to_runtime_config();
    let resolver = CredentialResolver::new(AwsCli::new(auth_config.clone()), auth_config.clone());
    let mut console = StdConsole::new();

    run_loop(
        &mut console,
        &resolver,
        cli.profile(),
        &extraction_config,
        |session| connect_s3(session, auth_config.clone()),
    )
    .await
}

async fn connect_s3(session: Session, auth: AuthConfig) -> DownloadResult<Arc<dyn ObjectStore>> {
    let store = S3Store::connect(&session, &auth).await?;
    Ok(Arc::new(store))
}

/// Authenticate, then extract repeatedly; restart from authentication on errors
///
/// `connect` opens the object store for a freshly resolved session.
///
/// Returns `Ok(())` once the console reports end of input. Fatal errors
/// (exhausted configuration attempts) are returned; everything else is
/// printed and retried.
pub async fn run_loop<C, T, F, Fut>(
    console: &mut C,
    resolver: &CredentialResolver<T>,
    profile: Option<&str>,
    extraction: &ExtractionConfig,
    mut connect: F,
) -> Result<()>
where
    C: Console + ?Sized,
    T: CredentialTool,
    F: FnMut(Session) -> Fut,
    Fut: Future<Output = DownloadResult<Arc<dyn ObjectStore>>>,
{
    loop {
        let session = match resolver.resolve(console, profile).await {
            Ok(session) => session,
            Err(e) => {
                let e = AppError::from(e);
                if e.is_input_closed() {
                    return Ok(());
                }
                if e.is_fatal() {
                    error!("Fatal {} error: {}", e.category(), e);
                    return Err(e);
                }
                warn!("Credential resolution failed: {}", e);
                console.say(&format!("\n** Authentication failed: {} **", e));
                continue;
            }
        };

        let store = match connect(session.clone()).await {
            Ok(store) => store,
            Err(e) => {
                report_iteration_error(console, &AppError::from(e));
                continue;
            }
        };

        let extractor = Extractor::new(store, extraction.clone());
        let e = match extraction_loop(console, &extractor).await {
            Ok(()) => continue,
            Err(e) => e,
        };

        if e.is_input_closed() {
            return Ok(());
        }
        if e.is_fatal() {
            return Err(e);
        }
        report_iteration_error(console, &e);
        info!("Restarting from authentication for profile '{}'", session.profile());
    }
}

/// Run extraction iterations until one fails
async fn extraction_loop<C: Console + ?Sized>(console: &mut C, extractor: &Extractor) -> Result<()> {
    loop {
        match extractor.run_once(console).await? {
            ExtractionOutcome::NoObjects { locator } => {
                debug!("Nothing to extract at {}", locator);
            }
            ExtractionOutcome::Extracted(summary) => {
                info!(
                    "Extracted {} into {} ({} downloaded, {} skipped{})",
                    summary.locator,
                    summary.destination.display(),
                    summary.report.downloaded,
                    summary.report.skipped,
                    summary
                        .archive
                        .as_ref()
                        .map(|path| format!(", archived to {}", path.display()))
                        .unwrap_or_default()
                );
            }
        }
    }
}

fn report_iteration_error<C: Console + ?Sized>(console: &mut C, error: &AppError) {
    warn!("Extraction iteration failed ({}): {}", error.category(), error);
    console.say(&format!(
        "\n** Error extracting bucket contents: {} **",
        error
    ));
}
