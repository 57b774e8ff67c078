//! Bucket Extractor CLI application
//!
//! Interactive tool that authenticates with AWS and copies S3 prefixes to
//! local disk. Interrupts and end of input exit cleanly; fatal errors exit
//! with status 1.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use bucket_extractor::cli::{run_extractor, wait_for_interrupt, Cli};
use bucket_extractor::config::AppConfig;
use bucket_extractor::errors::AppError;

const GOODBYE: &str = "\nExiting bucket extractor. Goodbye!";

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let config = match AppConfig::load(cli.global.config.clone()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    init_logging(&cli, &config);
    info!("Bucket Extractor v{} starting", env!("CARGO_PKG_VERSION"));

    // The loop runs on its own task and the interrupt is observed here;
    // stdin reads leave the runtime workers free via `block_in_place`
    let extractor = tokio::spawn(async move { run_extractor(&cli, &config).await });

    tokio::select! {
        _ = wait_for_interrupt() => {
            println!("{}", GOODBYE);
            process::exit(0);
        }
        result = extractor => match result {
            Ok(Ok(())) => println!("{}", GOODBYE),
            Ok(Err(e)) => exit_with_error(&e),
            Err(e) => exit_with_error(&AppError::generic(format!("Extractor task failed: {}", e))),
        }
    }
}

fn exit_with_error(e: &AppError) -> ! {
    error!("Fatal {} error: {}", e.category(), e);
    eprintln!("Error: {}", e);
    process::exit(1);
}

/// Initialize logging from CLI verbosity flags and the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let configured = config
        .logging
        .tracing_level()
        .unwrap_or(tracing::Level::WARN);
    let log_level = cli.log_level(configured);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("bucket_extractor={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
