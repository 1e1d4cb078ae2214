//! CLI entry point for the cluster distribution converter.
//!
//! Converts per-country weekly cluster tables into regularized, gap-filled
//! distributions for the web app, or dumps a single cluster's regularized
//! rows to CSV for inspection.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cluster_distributions::input::cluster_table_path;
use cluster_distributions::pipeline::{ConvertSettings, convert, inspect};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cluster_distributions")]
#[command(about = "Converts cluster tables into chart-ready distributions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert all cluster tables into web app JSON
    Convert {
        /// Directory containing the cluster tables
        #[arg(short, long, env = "CLUSTER_TABLES_PATH", default_value = "cluster_tables")]
        tables_dir: PathBuf,

        /// Directory to write JSON outputs to
        #[arg(short, long, env = "OUTPUT_PATH", default_value = "web/data")]
        output_dir: PathBuf,

        /// Cluster registry JSON (defaults to <TABLES_DIR>/clusters.json)
        #[arg(long)]
        clusters: Option<PathBuf>,

        /// Cluster names to leave out, comma-separated
        #[arg(long, value_delimiter = ',', default_value = "DanishCluster")]
        exclude: Vec<String>,

        /// Sort each distribution's weeks chronologically instead of first-seen order
        #[arg(long, default_value_t = false)]
        sort_weeks: bool,

        /// Maximum number of clusters processed in parallel
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Also write gzip-compressed copies of the JSON outputs
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Regularize one cluster table and append its rows to a CSV file
    Inspect {
        /// Build name of the cluster (reads <TABLES_DIR>/<BUILD_NAME>_data.json)
        #[arg(value_name = "BUILD_NAME")]
        build_name: String,

        /// Directory containing the cluster tables
        #[arg(short, long, env = "CLUSTER_TABLES_PATH", default_value = "cluster_tables")]
        tables_dir: PathBuf,

        /// CSV file to append results to
        #[arg(short, long, default_value = "regularized.csv")]
        output: PathBuf,
    },
}

/// Colored stderr + JSON rolling log file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/cluster_distributions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cluster_distributions.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            tables_dir,
            output_dir,
            clusters,
            exclude,
            sort_weeks,
            concurrency,
            gzip,
        } => {
            let registry_path = clusters.unwrap_or_else(|| tables_dir.join("clusters.json"));
            let settings = ConvertSettings {
                tables_dir,
                output_dir,
                registry_path,
                exclude,
                sort_by_week: sort_weeks,
                concurrency,
                gzip,
            };

            let summary = convert(&settings).await?;
            info!(
                countries = summary.countries,
                clusters = summary.clusters,
                output_dir = %settings.output_dir.display(),
                "Conversion finished"
            );
        }
        Commands::Inspect {
            build_name,
            tables_dir,
            output,
        } => {
            let table_path = cluster_table_path(&tables_dir, &build_name);
            inspect(&build_name, &table_path, &output)?;
        }
    }

    Ok(())
}
