//! FPD Ingest - fuel price data loader

use anyhow::{Context, Result};
use clap::Parser;
use fpd_common::logging::{init_logging, LogConfig, LogLevel};
use fpd_ingest::config::{IngestConfig, DEFAULT_BATCH_SIZE};
use fpd_ingest::pipeline::Pipeline;
use fpd_ingest::store::pg::PgStore;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fpd-ingest")]
#[command(author, version, about = "Fuel price dataset ingestion tool")]
struct Cli {
    /// Path to the semicolon-delimited CSV file
    file: PathBuf,

    /// Limit the number of rows read (for test runs)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Staged observations per batch commit
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging from the environment; the verbose flag wins
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    log_config.log_file_prefix = "fpd-ingest".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let config = IngestConfig {
        batch_size: cli.batch_size,
        row_limit: cli.limit,
        ..IngestConfig::default()
    };
    config.validate()?;

    info!(
        file = %cli.file.display(),
        batch_size = config.batch_size,
        row_limit = ?config.row_limit,
        "Starting fuel price ingestion"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let mut store = PgStore::new(pool);
    let report = Pipeline::new(&mut store, config).run_file(&cli.file).await?;

    println!("{}", report);

    info!("Ingestion complete");
    Ok(())
}
