use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use queryrace::application::benchmarking::{
    MatrixScheduler, RaceConfig, RaceReportWriter, ReportCollector, StepObserver,
    drive_cooperatively,
};
use queryrace::application::strategies::StrategyRegistry;
use queryrace::config::{Config, LogFormat, RaceEnvConfig, parse_strategy_list};
use queryrace::domain::events::LoggingReporter;
use queryrace::domain::race::ExecutionContexts;
use queryrace::domain::sandbox::Document;
use queryrace::infrastructure::observability::{Metrics, MetricsReporter};
use queryrace::infrastructure::{
    ProgressBus, SystemClock, default_workloads, load_workload_suite,
};
use queryrace::interfaces::{ConsoleReporter, TrackReporter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Race strategies over a workload suite
    Run {
        /// Comma-separated strategy ids (defaults to RACE_STRATEGIES)
        #[arg(short, long)]
        strategies: Option<String>,

        /// Minimum sampling time per cell, in milliseconds
        #[arg(long)]
        min: Option<u64>,

        /// Share one document between all strategies
        #[arg(long)]
        share: Option<bool>,

        /// Render the race track after every row
        #[arg(long)]
        track: Option<bool>,

        /// TOML workload suite (defaults to the bundled suite)
        #[arg(short, long)]
        workloads: Option<PathBuf>,

        /// Directory receiving the JSON race report
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// List registered strategies
    List,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.observability.log_format);

    match cli.command {
        Commands::List => list_strategies(&config.race),
        Commands::Run {
            strategies,
            min,
            share,
            track,
            workloads,
            report_dir,
        } => {
            let race = &mut config.race;
            if let Some(raw) = strategies {
                race.strategies = parse_strategy_list(&raw);
            }
            if let Some(min) = min {
                race.minimum_duration_ms = min;
            }
            if let Some(share) = share {
                race.share_context = share;
            }
            if let Some(track) = track {
                race.show_track = track;
            }
            if report_dir.is_some() {
                race.report_dir = report_dir;
            }
            run_race(&config, workloads).await
        }
    }
}

fn list_strategies(race: &RaceEnvConfig) -> Result<()> {
    let registry = StrategyRegistry::builtin(race.document_size, race.document_seed);
    for id in registry.ids() {
        let summary = registry.summary(id).unwrap_or_default();
        let marker = if race.strategies.iter().any(|s| s == id) {
            "(default)"
        } else {
            ""
        };
        println!("{:<12} {:<40} {}", id, summary, marker);
    }
    Ok(())
}

async fn run_race(config: &Config, suite: Option<PathBuf>) -> Result<()> {
    let race = &config.race;
    let workloads = match &suite {
        Some(path) => load_workload_suite(path)?,
        None => default_workloads(),
    };

    // Runner-owned documents and the race contexts come from the same size and seed,
    // so every strategy queries the same elements.
    let registry = StrategyRegistry::builtin(race.document_size, race.document_seed);
    let strategies = registry
        .select(race.strategies.as_slice())
        .context("Failed to resolve strategy selection")?;

    let contexts = if race.share_context {
        ExecutionContexts::shared(Arc::new(Document::generate(
            race.document_size,
            race.document_seed,
        )))
    } else {
        ExecutionContexts::per_strategy(
            strategies
                .iter()
                .map(|_| Arc::new(Document::generate(race.document_size, race.document_seed)))
                .collect(),
        )
    };

    let bus = ProgressBus::new();
    bus.subscribe(Arc::new(LoggingReporter));
    bus.subscribe(Arc::new(ConsoleReporter::new()));
    if race.show_track {
        bus.subscribe(Arc::new(TrackReporter::new(race.track_width)));
    }
    let collector = ReportCollector::new();
    if race.report_dir.is_some() {
        bus.subscribe(Arc::new(collector.clone()));
    }
    let metrics = if config.observability.metrics_enabled {
        Some(Metrics::new().context("Failed to create metrics")?)
    } else {
        None
    };
    if let Some(metrics) = &metrics {
        bus.subscribe(Arc::new(MetricsReporter::new(metrics.clone())));
    }
    let observer: StepObserver = metrics
        .as_ref()
        .map(|metrics| metrics.step_latency_seconds.clone());

    let mut scheduler = MatrixScheduler::new(Arc::new(bus), Arc::new(SystemClock::new()));
    scheduler.start(
        RaceConfig::new(workloads, strategies, contexts)
            .with_minimum_duration_ms(race.minimum_duration_ms),
    )?;

    let cancel = scheduler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping the race after the current cell");
            cancel.cancel();
        }
    });

    let outcome = drive_cooperatively(&mut scheduler, &observer).await?;
    info!(
        "Race {} after {} rows",
        outcome.state, outcome.rows_completed
    );

    if let Some(dir) = &race.report_dir {
        RaceReportWriter::new(dir)?.write(&collector.report())?;
    }
    if let Some(metrics) = metrics {
        println!("{}", metrics.render());
    }
    Ok(())
}
