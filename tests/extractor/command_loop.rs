//! Outer command loop tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use bucket_extractor::app::{ExtractionConfig, ObjectStore};
use bucket_extractor::auth::{AuthConfig, CredentialResolver, Session};
use bucket_extractor::cli::{run_loop, ScriptedConsole};
use bucket_extractor::errors::{AppError, AuthError, DownloadResult};

use crate::fakes::{extraction_config, reports_store, MemoryStore, ScriptedTool};

fn ops_resolver(temp: &TempDir) -> CredentialResolver<ScriptedTool> {
    let tool = ScriptedTool {
        static_profile: Some("ops".to_string()),
        ..Default::default()
    };
    CredentialResolver::new(tool, AuthConfig::default().with_config_dir(temp.path()))
}

async fn drive(
    console: &mut ScriptedConsole,
    resolver: &CredentialResolver<ScriptedTool>,
    profile: Option<&str>,
    extraction: &ExtractionConfig,
    store: Arc<MemoryStore>,
    connections: &AtomicUsize,
) -> bucket_extractor::Result<()> {
    run_loop(console, resolver, profile, extraction, |_session: Session| {
        connections.fetch_add(1, Ordering::SeqCst);
        let store = Arc::clone(&store);
        async move { DownloadResult::Ok(store as Arc<dyn ObjectStore>) }
    })
    .await
}

/// Test that an empty location keeps the loop going and end of input stops it
#[tokio::test]
async fn test_loop_continues_after_empty_location() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let resolver = ops_resolver(&temp);
    let connections = AtomicUsize::new(0);

    let mut console = ScriptedConsole::new([
        "n",
        "s3://empty-bucket/x",
        "s3://my-bucket/reports",
        "",
        "n",
    ]);
    let result = drive(
        &mut console,
        &resolver,
        Some("ops"),
        &extraction_config(&output),
        Arc::new(reports_store()),
        &connections,
    )
    .await;

    assert!(result.is_ok());
    assert!(console.printed("No objects found at the given location"));
    assert!(output.join("my-bucket/reports/c.csv").exists());
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

/// Test that an iteration error is reported and authentication starts over
#[tokio::test]
async fn test_batch_failure_restarts_from_authentication() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let resolver = ops_resolver(&temp);
    let connections = AtomicUsize::new(0);

    let mut console = ScriptedConsole::new(["n", "s3://my-bucket/reports", "", "n"]);
    let result = drive(
        &mut console,
        &resolver,
        Some("ops"),
        &extraction_config(&output),
        Arc::new(reports_store().with_failing_key("reports/a.csv")),
        &connections,
    )
    .await;

    assert!(result.is_ok());
    assert!(console.printed("** Error extracting bucket contents: 1 of 3 downloads failed"));
    assert_eq!(connections.load(Ordering::SeqCst), 2);
    assert_eq!(resolver.tool().count("identity ops"), 2);
}

/// Test that non-fatal authentication failures are retried
#[tokio::test]
async fn test_authentication_failure_is_retried() {
    let temp = TempDir::new().unwrap();
    let tool = ScriptedTool {
        sso_configured: Mutex::new(true),
        identity: None,
        ..Default::default()
    };
    let resolver = CredentialResolver::new(tool, AuthConfig::default().with_config_dir(temp.path()));
    let connections = AtomicUsize::new(0);

    let mut console = ScriptedConsole::new(["y", "", "y", ""]);
    let result = drive(
        &mut console,
        &resolver,
        None,
        &extraction_config(&temp.path().join("Extractions")),
        Arc::new(MemoryStore::new()),
        &connections,
    )
    .await;

    assert!(result.is_ok());
    assert!(console.printed("Authentication failed"));
    assert_eq!(resolver.tool().count("sso login default"), 2);
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

/// Test that exhausting configuration attempts ends the loop with an error
#[tokio::test]
async fn test_configuration_exhaustion_is_fatal() {
    let temp = TempDir::new().unwrap();
    let resolver = CredentialResolver::new(
        ScriptedTool::default(),
        AuthConfig::default().with_config_dir(temp.path()),
    );
    let connections = AtomicUsize::new(0);

    let mut console = ScriptedConsole::new(["n"]);
    let result = drive(
        &mut console,
        &resolver,
        None,
        &extraction_config(&temp.path().join("Extractions")),
        Arc::new(MemoryStore::new()),
        &connections,
    )
    .await;

    match result {
        Err(e @ AppError::Auth(AuthError::ConfigurationExhausted { .. })) => {
            assert!(e.is_fatal())
        }
        other => panic!("expected fatal configuration error, got {:?}", other),
    }
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}
