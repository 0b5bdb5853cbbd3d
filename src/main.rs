// nc_loader/src/main.rs
// Main entry point for the nc_loader CLI application.

use clap::Parser;
use nc_loader::cli::Cli;
use nc_loader::config::{LoaderConfig, RunOptions};
use nc_loader::controller::{IngestionRun, IngestionStats};
use nc_loader::error::{LoaderError, Result};
use nc_loader::mongo::{MongoConnector, MongoSink};
use nc_loader::registry::CollectionRegistry;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Serialize,)]
struct CollectionOutcome {
    collection:   String,
    rows:         Option<u64,>,
    batches:      Option<u64,>,
    elapsed_secs: Option<f64,>,
    stage:        Option<&'static str,>,
    error:        Option<String,>,
}

#[derive(Serialize, Default,)]
struct Report {
    total_collections: usize,
    success_count:     usize,
    failure_count:     usize,
    outcomes:          Vec<CollectionOutcome,>,
}

impl Report {
    fn record_success(&mut self, stats: &IngestionStats,) {
        self.total_collections += 1;
        self.success_count += 1;
        self.outcomes.push(CollectionOutcome {
            collection:   stats.collection.clone(),
            rows:         Some(stats.rows,),
            batches:      Some(stats.batches,),
            elapsed_secs: Some(stats.elapsed_secs(),),
            stage:        None,
            error:        None,
        },);
    }

    fn record_error(&mut self, collection: &str, err: &LoaderError,) {
        self.total_collections += 1;
        self.failure_count += 1;
        self.outcomes.push(CollectionOutcome {
            collection:   collection.to_string(),
            rows:         None,
            batches:      None,
            elapsed_secs: None,
            stage:        Some(err.stage(),),
            error:        Some(err.to_string(),),
        },);
    }

    fn save(&self,) -> Result<(),> {
        let json = serde_json::to_string_pretty(self,).map_err(|e| {
            LoaderError::Other(format!("Failed to serialize ingestion report: {}", e),)
        },)?;
        std::fs::write("ingestion_report.json", json,)?;
        info!("Ingestion report saved to ingestion_report.json");
        Ok((),)
    }
}

#[tokio::main]
async fn main() -> Result<(),> {
    // Initialize tracing
    let file_appender = tracing_appender::rolling::never(".", "loader.log",);
    let (non_blocking, _guard,) = tracing_appender::non_blocking(file_appender,);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),),)
        .with(fmt::layer().with_writer(std::io::stderr,),)
        .with(fmt::layer().with_writer(non_blocking,).with_ansi(false,),)
        .init();

    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path,) => LoaderConfig::from_file(path,)?,
        None => LoaderConfig::default(),
    };
    let config = cli.apply(file_config,);
    let options = config.run_options()?;

    let selected = cli.selected(&config,);
    if selected.is_empty() {
        return Err(LoaderError::ConfigurationError(
            "no collections configured: pass --collection NAME:PATH or set [collections] in the \
             config file"
                .to_string(),
        ),);
    }

    let connector = MongoConnector::connect(&config.connection_uri(), &config.database,).await?;
    let registry = connector.registry(&config.collections,)?;

    let report = run_collections(&registry, &selected, &options, cli.strict,).await;

    if cli.report {
        report.save()?;
    }

    if report.failure_count > 0 {
        return Err(LoaderError::Other(format!(
            "{} of {} collections failed",
            report.failure_count, report.total_collections
        ),),);
    }
    Ok((),)
}

/// Runs each collection to completion before starting the next.
async fn run_collections(
    registry: &CollectionRegistry<MongoSink,>,
    selected: &[String],
    options: &RunOptions,
    strict: bool,
) -> Report {
    let mut report = Report::default();

    for name in selected {
        let mut run = IngestionRun::new(name.clone(), options.clone(),);
        match run.run(registry,).await {
            Ok(stats,) => report.record_success(&stats,),
            Err(e,) => {
                report.record_error(name, &e,);
                if strict {
                    error!("Strict mode enabled. Halting after failure of '{}'", name);
                    break;
                }
                warn!("Continuing with the next collection after failure of '{}'", name);
            },
        }
    }

    report
}
