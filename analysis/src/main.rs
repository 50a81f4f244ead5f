mod chart;
mod metrics;

use clap::Parser;
use metrics::LoadError;
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chart the metrics file written by ginbench")]
struct Args {
    /// metrics file written by the benchmark
    #[arg(short, long, default_value = "metrics.json")]
    input: PathBuf,

    /// SVG file to render the chart into
    #[arg(short, long, default_value = "index_comparison_from_json.svg")]
    output: PathBuf,

    /// also print the bars to the terminal
    #[arg(long)]
    show: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // a missing or broken metrics file is reported but not a failure of this tool
    let metrics = match metrics::load(&args.input) {
        Ok(metrics) => metrics,
        Err(LoadError::NotFound(path)) => {
            warn!(path = ?path, "No metrics file found, run the benchmark first");

            return ExitCode::SUCCESS;
        }
        Err(error) => {
            warn!(error = ?error, path = ?args.input, "Could not read metrics: {error}");

            return ExitCode::SUCCESS;
        }
    };

    if metrics.is_empty() {
        println!("No data to plot.");

        return ExitCode::SUCCESS;
    }

    if let Err(error) = chart::render(&args.output, &metrics) {
        error!(error = ?error, path = ?args.output, "Failed to render chart: {error}");

        return ExitCode::FAILURE;
    }
    info!(path = ?args.output, queries = metrics.len(), "Chart saved");

    if args.show {
        println!("{}", chart::TITLE);
        for line in chart::text_bars(&metrics) {
            println!("{line}");
        }
    }

    ExitCode::SUCCESS
}
