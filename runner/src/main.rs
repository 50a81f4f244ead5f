use clap::Parser;
use ginbench_runner::{
    config::{BenchConfig, PlanFormat},
    harness, metrics, report,
    store::{postgres::PostgresStore, Store},
};
use std::{num::NonZeroU64, path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark B-tree against GIN indexes on PostgreSQL")]
struct Args {
    /// YAML configuration file, every value has a default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// synthetic rows per table
    #[arg(long)]
    rows: Option<u64>,

    /// rows per insert and commit
    #[arg(long)]
    batch_size: Option<NonZeroU64>,

    /// seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,

    /// path of the metrics file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    plan_format: Option<PlanFormat>,

    /// do not write the metrics file
    #[arg(long)]
    no_save: bool,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    user: Option<String>,
}

impl Args {
    /// command line values take precedence over the configuration file
    fn apply(self, config: &mut BenchConfig) {
        if let Some(rows) = self.rows {
            config.workload.row_count = rows;
        }
        if let Some(batch_size) = self.batch_size {
            config.workload.batch_size = batch_size;
        }
        if self.seed.is_some() {
            config.workload.seed = self.seed;
        }
        if let Some(output) = self.output {
            config.report.output = output;
        }
        if let Some(plan_format) = self.plan_format {
            config.report.plan_format = plan_format;
        }
        if self.no_save {
            config.report.save = false;
        }
        if self.no_progress {
            config.report.progress = false;
        }
        if let Some(host) = self.host {
            config.database.host = host;
        }
        if let Some(port) = self.port {
            config.database.port = port;
        }
        if let Some(database) = self.database {
            config.database.database = database;
        }
        if let Some(user) = self.user {
            config.database.user = user;
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.config.as_deref().map(BenchConfig::load) {
        Some(Ok(config)) => config,
        Some(Err(error)) => {
            error!(error = ?error, path = ?args.config, "Failed to load configuration: {error}");

            return ExitCode::FAILURE;
        }
        None => BenchConfig::default(),
    };
    args.apply(&mut config);

    if config.preflight_checks() {
        error!("Configuration contains errors, aborting");

        return ExitCode::FAILURE;
    }

    let mut store = match PostgresStore::connect(&config.database) {
        Ok(store) => store,
        Err(_) => return ExitCode::FAILURE,
    };

    let extractor = config.report.plan_format.extractor();
    let metrics = match harness::run(&mut store, &config, extractor.as_ref()) {
        Ok(metrics) => metrics,
        Err(error) => {
            error!(error = ?error, "Benchmark aborted: {error}");

            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = report::print(&metrics) {
        warn!(error = ?error, "Failed to print results table: {error}");
    }

    let mut status = ExitCode::SUCCESS;
    if config.report.save {
        match metrics::save(&config.report.output, &metrics) {
            Ok(()) => info!(path = ?config.report.output, "Saved metrics"),
            Err(error) => {
                error!(error = ?error, path = ?config.report.output, "Failed to save metrics: {error}");
                status = ExitCode::FAILURE;
            }
        }
    }

    if let Err(error) = store.close() {
        warn!(error = ?error, "Failed to close the session cleanly: {error}");
    }

    status
}
