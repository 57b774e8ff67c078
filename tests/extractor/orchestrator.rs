//! Extraction orchestrator and download pool tests

use std::fs::File;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use bucket_extractor::app::{
    plan_tasks, DownloadPool, ExtractionOutcome, Extractor, PoolConfig, StorageLocator,
};
use bucket_extractor::cli::{ProgressConfig, ProgressTracker, ScriptedConsole};
use bucket_extractor::errors::{AppError, DownloadError};

use crate::fakes::{extraction_config, reports_store, MemoryStore};

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Test the full iteration for a prefix with nested keys, archive declined
#[tokio::test]
async fn test_extracts_prefix_into_bucket_directory() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let store = Arc::new(reports_store());
    let extractor = Extractor::new(store.clone(), extraction_config(&output));

    let mut console = ScriptedConsole::new(["s3://my-bucket/reports", "", "n"]);
    let outcome = extractor.run_once(&mut console).await.unwrap();

    let reports = output.join("my-bucket").join("reports");
    assert_eq!(read(&reports.join("a.csv")), "id,value\n1,10\n");
    assert_eq!(read(&reports.join("b.csv")), "id,value\n2,20\n");
    assert_eq!(read(&reports.join("c.csv")), "id,value\n3,30\n");
    assert!(!reports.join("ignored.csv").exists());
    assert!(!output.join("my-bucket.zip").exists());

    match outcome {
        ExtractionOutcome::Extracted(summary) => {
            assert_eq!(summary.destination, reports);
            assert_eq!(summary.report.total, 3);
            assert_eq!(summary.report.downloaded, 3);
            assert!(summary.archive.is_none());
        }
        other => panic!("expected extraction, got {:?}", other),
    }
    assert_eq!(console.remaining(), 0);
}

/// Test that an empty listing creates nothing and is not an error
#[tokio::test]
async fn test_empty_location_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let extractor = Extractor::new(Arc::new(MemoryStore::new()), extraction_config(&output));

    let mut console = ScriptedConsole::new(["s3://empty-bucket/x"]);
    let outcome = extractor.run_once(&mut console).await.unwrap();

    assert!(matches!(outcome, ExtractionOutcome::NoObjects { .. }));
    assert!(console.printed("No objects found at the given location: s3://empty-bucket/x"));
    assert!(!output.join("empty-bucket").exists());
}

/// Test that the archive holds entries relative to the bucket directory
#[tokio::test]
async fn test_archive_requested() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let extractor = Extractor::new(Arc::new(reports_store()), extraction_config(&output));

    let mut console = ScriptedConsole::new(["s3://my-bucket/reports*", "4", "Y"]);
    let outcome = extractor.run_once(&mut console).await.unwrap();

    let zip_path = output.join("my-bucket.zip");
    match outcome {
        ExtractionOutcome::Extracted(summary) => {
            assert_eq!(summary.archive.as_deref(), Some(zip_path.as_path()))
        }
        other => panic!("expected extraction, got {:?}", other),
    }

    let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"reports/a.csv"));
    assert!(names.contains(&"reports/c.csv"));
    assert!(!names.iter().any(|n| n.starts_with("my-bucket")));
}

/// Test that a second run against unchanged remote state downloads nothing
#[tokio::test]
async fn test_second_run_skips_existing_files() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let store = Arc::new(reports_store());
    let extractor = Extractor::new(store.clone(), extraction_config(&output));
    let locator = StorageLocator::parse("s3://my-bucket/reports").unwrap();

    let mut console = ScriptedConsole::new(["", "n", "", "n"]);
    extractor.run_for(&mut console, locator.clone()).await.unwrap();
    assert_eq!(store.downloads(), 3);

    let outcome = extractor.run_for(&mut console, locator).await.unwrap();
    assert_eq!(store.downloads(), 3);
    match outcome {
        ExtractionOutcome::Extracted(summary) => {
            assert_eq!(summary.report.skipped, 3);
            assert_eq!(summary.report.downloaded, 0);
        }
        other => panic!("expected extraction, got {:?}", other),
    }
}

/// Test that existing files are downloaded again when skipping is turned off
#[tokio::test]
async fn test_existing_files_overwritten_without_skip() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let reports = output.join("my-bucket").join("reports");
    std::fs::create_dir_all(&reports).unwrap();
    std::fs::write(reports.join("a.csv"), "stale contents\n").unwrap();

    let store = Arc::new(reports_store());
    let extractor = Extractor::new(
        store.clone(),
        extraction_config(&output).with_skip_existing(false),
    );

    let mut console = ScriptedConsole::new(["s3://my-bucket/reports", "", "n"]);
    let outcome = extractor.run_once(&mut console).await.unwrap();

    assert_eq!(read(&reports.join("a.csv")), "id,value\n1,10\n");
    assert_eq!(store.downloads(), 3);
    match outcome {
        ExtractionOutcome::Extracted(summary) => {
            assert_eq!(summary.report.downloaded, 3);
            assert_eq!(summary.report.skipped, 0);
        }
        other => panic!("expected extraction, got {:?}", other),
    }
}

/// Test that an absurd worker count is asked again instead of reaching the pool
#[tokio::test]
async fn test_oversized_worker_count_is_asked_again() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let store = Arc::new(reports_store());
    let extractor = Extractor::new(store.clone(), extraction_config(&output));

    let mut console =
        ScriptedConsole::new(["s3://my-bucket/reports", "3000000000000000000", "2", "n"]);
    let outcome = extractor.run_once(&mut console).await.unwrap();

    assert!(matches!(outcome, ExtractionOutcome::Extracted(_)));
    assert!(console.printed("Worker count must be a whole number from 1 to 1024"));
    assert_eq!(store.downloads(), 3);
    assert!(store.max_active.load(Ordering::SeqCst) <= 2);
    assert_eq!(console.remaining(), 0);
}

/// Test that one failed transfer fails the batch only after siblings finish
#[tokio::test]
async fn test_failed_transfer_surfaces_after_batch() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("Extractions");
    let store = Arc::new(reports_store().with_failing_key("reports/b.csv"));
    let extractor = Extractor::new(store.clone(), extraction_config(&output));

    let mut console = ScriptedConsole::new(["s3://my-bucket/reports", "1"]);
    let result = extractor.run_once(&mut console).await;

    match result {
        Err(AppError::Download(DownloadError::BatchFailed {
            failed,
            total,
            first,
        })) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 3);
            assert!(first.contains("reports/b.csv"));
        }
        other => panic!("expected batch failure, got {:?}", other),
    }

    let reports = output.join("my-bucket").join("reports");
    assert!(reports.join("a.csv").exists());
    assert!(reports.join("c.csv").exists());
    assert!(!reports.join("b.csv").exists());
    assert_eq!(store.downloads(), 3);
    // The archive question is never reached
    assert!(!console.printed("compress"));
}

/// Test that the pool never exceeds its worker limit and completes every task
#[tokio::test]
async fn test_pool_respects_worker_limit() {
    let temp = TempDir::new().unwrap();
    let mut store = MemoryStore::new().with_delay(Duration::from_millis(20));
    let keys: Vec<String> = (0..20).map(|i| format!("data/file-{:02}.bin", i)).collect();
    for key in &keys {
        store = store.with_object("bulk", key, "payload");
    }
    let store = Arc::new(store);

    let pool = DownloadPool::new(
        store.clone(),
        PoolConfig {
            max_workers: 3,
            ..Default::default()
        },
    );
    let tasks = plan_tasks(&keys, temp.path());
    let progress = ProgressTracker::new(tasks.len(), &ProgressConfig::disabled());

    let report = pool.run("bulk", tasks, &progress).await;

    assert!(report.is_success());
    assert_eq!(report.downloaded, 20);
    assert_eq!(report.bytes, 20 * 7);
    assert!(store.max_active.load(Ordering::SeqCst) <= 3);
    assert!(store.max_active.load(Ordering::SeqCst) >= 1);
    assert_eq!(progress.units(), 40);
    assert_eq!(progress.whole_units(), 20);
    assert_eq!(progress.completed_tasks(), 20);
}

/// Test that slow transfers time out without leaving partial files
#[tokio::test]
async fn test_pool_times_out_slow_transfers() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(
        MemoryStore::new()
            .with_object("slow", "big/blob.bin", "data")
            .with_delay(Duration::from_millis(500)),
    );
    let pool = DownloadPool::new(
        store,
        PoolConfig {
            max_workers: 2,
            skip_existing: true,
            download_timeout: Duration::from_millis(20),
        },
    );
    let tasks = plan_tasks(&["big/blob.bin"], temp.path());
    let progress = ProgressTracker::new(tasks.len(), &ProgressConfig::disabled());

    let report = pool.run("slow", tasks, &progress).await;

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.failures[0].1,
        DownloadError::Timeout { .. }
    ));
    assert!(!temp.path().join("blob.bin").exists());
    assert!(!temp.path().join("blob.bin.part").exists());
    assert_eq!(progress.whole_units(), 1);
}

/// Test that a worker limit beyond the semaphore capacity is clamped
#[tokio::test]
async fn test_pool_clamps_oversized_worker_limit() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(reports_store());
    let pool = DownloadPool::new(
        store.clone(),
        PoolConfig {
            max_workers: usize::MAX,
            ..Default::default()
        },
    );
    let keys = ["reports/a.csv", "reports/b.csv", "reports/sub/c.csv"];
    let tasks = plan_tasks(&keys, temp.path());
    let progress = ProgressTracker::new(tasks.len(), &ProgressConfig::disabled());

    let report = pool.run("my-bucket", tasks, &progress).await;

    assert!(report.is_success());
    assert_eq!(report.downloaded, 3);
    assert_eq!(store.downloads(), 3);
}
