mod config;
mod registry;

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use config::{AppConfig, ConfigError};
use grocery_core::{Error as CoreError, InventorySnapshot, ProductSalesRow, Warehouse};
use grocery_generate::{GenerateError, GenerationEngine, GenerationReport};
use grocery_inventory::{ReconciliationReport, Reconciler, query_low_stock, top_products};
use grocery_store::{InMemoryWarehouse, PostgresWarehouse};
use registry::{
    RunContext, RunPaths, init_run_logging, redact_connection_string, start_run, write_report,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "grocery", version, about = "Grocery warehouse data synthesis and inventory reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Populate the warehouse with a synthetic star-schema dataset.
    Generate(GenerateArgs),
    /// Derive inventory snapshots from persisted sales.
    Reconcile(ReconcileArgs),
    /// List inventory snapshots below a threshold.
    LowStock(LowStockArgs),
    /// List best-selling products by quantity.
    TopProducts(TopProductsArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// TOML config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Postgres connection string; overrides the config file.
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,
    /// Output directory for runs; overrides the config file.
    #[arg(long)]
    run_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Seed for reproducible datasets.
    #[arg(long)]
    seed: Option<u64>,
    /// First day of the date dimension (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,
    /// Last day of the date dimension (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,
    /// Directory for CSV export of an in-memory run (defaults to the run directory).
    #[arg(long, value_name = "DIR", conflicts_with = "database_url")]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Stock each product starts a period with.
    #[arg(long)]
    baseline: Option<i64>,
    /// Low-stock threshold for the alert pass.
    #[arg(long)]
    threshold: Option<i64>,
    /// Append baseline snapshots for every product before updating.
    #[arg(long, default_value_t = false)]
    init: bool,
}

#[derive(Args, Debug)]
struct LowStockArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    threshold: Option<i64>,
}

#[derive(Args, Debug)]
struct TopProductsArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 10)]
    limit: i64,
}

/// Report written by `generate`.
#[derive(Debug, Serialize)]
struct GenerateSummary {
    #[serde(flatten)]
    report: GenerationReport,
    exported: Vec<ExportedFile>,
}

#[derive(Debug, Serialize)]
struct ExportedFile {
    table: String,
    path: PathBuf,
    rows: u64,
    bytes: u64,
}

/// Report written by `reconcile`.
#[derive(Debug, Serialize)]
struct ReconcileSummary {
    #[serde(flatten)]
    report: ReconciliationReport,
    low_stock_rows: Vec<InventorySnapshot>,
}

#[derive(Debug, Serialize)]
struct LowStockSummary {
    threshold: i64,
    rows: Vec<InventorySnapshot>,
}

#[derive(Debug, Serialize)]
struct TopProductsSummary {
    limit: i64,
    rows: Vec<ProductSalesRow>,
}

/// An opened run: resolved config, artifact paths and an optional database URL.
struct Session {
    config: AppConfig,
    paths: RunPaths,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Reconcile(args) => run_reconcile(args).await,
        Command::LowStock(args) => run_low_stock(args).await,
        Command::TopProducts(args) => run_top_products(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        common,
        seed,
        start,
        end,
        out_dir,
    } = args;

    let mut config = load_config(&common)?;
    if seed.is_some() {
        config.generate.seed = seed;
    }
    if let Some(start) = start {
        config.generate.start_date = start;
    }
    if let Some(end) = end {
        config.generate.end_date = end;
    }

    check_export_target(&config, out_dir.as_deref())?;

    let session = open_session("generate", config, &common)?;
    let engine = GenerationEngine::new(session.config.generate.clone());
    let timer = Instant::now();

    let summary = match session.database_url.as_deref() {
        Some(url) => {
            let warehouse = PostgresWarehouse::connect(url).await?;
            let report = generate_into(&engine, &warehouse, &session.paths).await?;
            GenerateSummary {
                report,
                exported: Vec::new(),
            }
        }
        None => {
            let warehouse = InMemoryWarehouse::new();
            let report = generate_into(&engine, &warehouse, &session.paths).await?;
            let dir = out_dir.unwrap_or_else(|| session.paths.root.clone());
            create_dir_all(&dir)?;
            let exported = warehouse
                .export_csv(&dir)?
                .into_iter()
                .map(|table| ExportedFile {
                    table: table.table.name().to_string(),
                    path: table.path,
                    rows: table.rows,
                    bytes: table.bytes,
                })
                .collect::<Vec<_>>();
            tracing::info!(
                event = "csv_exported",
                dir = %dir.display(),
                files = exported.len()
            );
            GenerateSummary { report, exported }
        }
    };

    write_report(&session.paths, &summary)?;
    tracing::info!(event = "report_written", path = %session.paths.report_path.display());

    print_json(&summary)?;
    finish(timer);
    Ok(())
}

/// CSV export only exists for in-memory runs, wherever the database URL came from.
fn check_export_target(config: &AppConfig, out_dir: Option<&Path>) -> Result<(), CliError> {
    match (config.database_url.as_deref(), out_dir) {
        (Some(_), Some(dir)) => Err(CliError::InvalidConfig(format!(
            "--out-dir {} only applies without a database URL",
            dir.display()
        ))),
        _ => Ok(()),
    }
}

/// Run the engine; a partial report is still written when a phase fails.
async fn generate_into<W: Warehouse>(
    engine: &GenerationEngine,
    warehouse: &W,
    paths: &RunPaths,
) -> Result<GenerationReport, CliError> {
    match engine.run(warehouse).await {
        Ok(report) => Ok(report),
        Err(GenerateError::Failed { source, report }) => {
            write_report(paths, &report)?;
            tracing::info!(event = "run_finished", status = "failed", error = %source);
            Err(GenerateError::Failed { source, report }.into())
        }
    }
}

async fn run_reconcile(args: ReconcileArgs) -> Result<(), CliError> {
    let ReconcileArgs {
        common,
        baseline,
        threshold,
        init,
    } = args;

    let mut config = load_config(&common)?;
    if let Some(baseline) = baseline {
        config.reconcile.baseline = baseline;
    }
    if let Some(threshold) = threshold {
        config.reconcile.threshold = threshold;
    }

    let session = open_session("reconcile", config, &common)?;
    let warehouse = connect(&session).await?;
    let timer = Instant::now();

    let outcome = Reconciler::new(session.config.reconcile.clone())
        .run(&warehouse, init)
        .await?;
    let summary = ReconcileSummary {
        report: outcome.report,
        low_stock_rows: outcome.low_stock,
    };

    write_report(&session.paths, &summary)?;
    print_json(&summary)?;
    finish(timer);
    Ok(())
}

async fn run_low_stock(args: LowStockArgs) -> Result<(), CliError> {
    let LowStockArgs { common, threshold } = args;

    let mut config = load_config(&common)?;
    if let Some(threshold) = threshold {
        config.reconcile.threshold = threshold;
    }

    let session = open_session("low-stock", config, &common)?;
    let warehouse = connect(&session).await?;
    let timer = Instant::now();

    let threshold = session.config.reconcile.threshold;
    let rows = query_low_stock(&warehouse, threshold).await?;
    tracing::info!(event = "low_stock_queried", threshold, rows = rows.len());

    let summary = LowStockSummary { threshold, rows };
    write_report(&session.paths, &summary)?;
    print_json(&summary)?;
    finish(timer);
    Ok(())
}

async fn run_top_products(args: TopProductsArgs) -> Result<(), CliError> {
    let TopProductsArgs { common, limit } = args;
    if limit < 1 {
        return Err(CliError::InvalidConfig(
            "--limit must be at least 1".to_string(),
        ));
    }

    let config = load_config(&common)?;
    let session = open_session("top-products", config, &common)?;
    let warehouse = connect(&session).await?;
    let timer = Instant::now();

    let rows = top_products(&warehouse, limit).await?;
    tracing::info!(event = "top_products_queried", limit, rows = rows.len());

    let summary = TopProductsSummary { limit, rows };
    write_report(&session.paths, &summary)?;
    print_json(&summary)?;
    finish(timer);
    Ok(())
}

fn load_config(common: &CommonArgs) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::load(common.config.as_deref())?;
    if common.database_url.is_some() {
        config.database_url = common.database_url.clone();
    }
    if let Some(run_dir) = &common.run_dir {
        config.run_dir = run_dir.clone();
    }
    Ok(config)
}

/// Create the run directory and install logging for the rest of the process.
fn open_session(
    command: &str,
    config: AppConfig,
    common: &CommonArgs,
) -> Result<Session, CliError> {
    let database_url = config.database_url.clone();
    if let Some(url) = database_url.as_deref() {
        detect_engine(url)?;
    }

    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        command: command.to_string(),
        run_dir: config.run_dir.clone(),
        connection: database_url.as_deref().map(redact_connection_string),
    };

    let paths = start_run(&ctx, &config)?;
    init_run_logging(&paths.logs_path)?;

    let backend = if database_url.is_some() {
        "postgres"
    } else {
        "memory"
    };
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        command,
        backend,
        config_file = ?common.config.as_ref().map(|path| path.display().to_string())
    );

    Ok(Session {
        config,
        paths,
        database_url,
    })
}

async fn connect(session: &Session) -> Result<PostgresWarehouse, CliError> {
    let url = session.database_url.as_deref().ok_or_else(|| {
        CliError::InvalidConfig(
            "a database URL is required (--database-url or database_url in the config file)"
                .to_string(),
        )
    })?;
    let warehouse = PostgresWarehouse::connect(url).await?;
    tracing::info!(event = "database_connected");
    Ok(warehouse)
}

fn detect_engine(conn: &str) -> Result<(), CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok(())
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn finish(timer: Instant) {
    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
}
