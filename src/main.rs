//! # GH Archive Day Documents Entry Point
//!
//! Loads one archive partition, aggregates it and prints or stores the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gharchive_days::{
    config::{AppConfig, ConfigLoader},
    db,
    pipeline::{self, Pipeline},
    repositories::DayDocumentRepository,
    sink::{ConsoleSink, DatabaseSink},
    source::{ArchiveFile, ArchiveHour, EventSource, GhArchiveClient},
    telemetry,
};
use tracing::info;

/// Aggregate a GH Archive partition into per-day documents.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Local archive (.json or .json.gz) to read instead of downloading
    #[arg(long, value_name = "PATH", conflicts_with = "hour")]
    input: Option<PathBuf>,

    /// Partition to download, e.g. 2025-01-02-15
    #[arg(long, value_name = "YYYY-MM-DD-H")]
    hour: Option<ArchiveHour>,

    /// Number of single-row sample documents to print
    #[arg(long, value_name = "N")]
    samples: Option<usize>,

    /// Print the full document instead of the samples
    #[arg(long)]
    print_full: bool,

    /// Store the full document in the configured database
    #[arg(long)]
    persist: bool,
}

fn event_source(cli: &Cli, config: &AppConfig) -> Result<Box<dyn EventSource>> {
    if let Some(path) = &cli.input {
        return Ok(Box::new(ArchiveFile::new(path)));
    }

    let hour = match cli.hour {
        Some(hour) => hour,
        None => config.archive_hour()?,
    };
    let client = GhArchiveClient::new(config.base_url()?, hour, config.http_timeout())
        .context("building archive http client")?;
    Ok(Box::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing telemetry")?;

    if let Ok(redacted) = config.redacted_json() {
        info!(profile = %config.profile, config = %redacted, "Loaded configuration");
    }

    if cli.persist && !config.persistence_enabled() {
        bail!("--persist requires GHDAYS_DATABASE_URL to be set");
    }

    let pipeline = Pipeline::new(
        config.weekday_namer()?,
        cli.samples.unwrap_or(config.sample_size),
    );

    let source = event_source(&cli, &config)?;
    let output = pipeline
        .run_source(source.as_ref())
        .await
        .with_context(|| format!("processing {}", source.describe()))?;

    let printed = if cli.print_full {
        std::slice::from_ref(&output.full)
    } else {
        output.samples.as_slice()
    };
    pipeline::deliver(&mut ConsoleSink::stdout(), printed)
        .await
        .context("printing documents")?;

    if cli.persist {
        let conn = db::connect_and_migrate(&config)
            .await
            .context("initializing document store")?;
        let mut sink = DatabaseSink::new(DayDocumentRepository::new(Arc::new(conn)));
        pipeline::deliver(&mut sink, std::slice::from_ref(&output.full))
            .await
            .context("storing full document")?;
        info!(
            documents = sink.written(),
            registers = output.full.registers.len(),
            "Persisted day document"
        );
    }

    Ok(())
}
