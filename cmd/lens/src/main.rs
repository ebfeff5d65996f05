//! Lens CLI - natural-language search and span explanation for Jaeger.
//!
//! Commands:
//! - `lens search` - Translate a question into Jaeger search parameters
//! - `lens explain` - Explain a span from a file, stdin or a built-in sample
//! - `lens samples` - List the built-in sample spans

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lens")]
#[command(about = "Natural-language trace search and span explanation for Jaeger")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a natural-language query into Jaeger search parameters
    Search {
        /// The query, e.g. "slow requests in payment service"
        query: String,

        /// Service to use when the query names none
        #[arg(short = 's', long, env = "LENS_DEFAULT_SERVICE")]
        default_service: Option<String>,

        /// Pretty-print the JSON response
        #[arg(short, long)]
        pretty: bool,
    },

    /// Explain a Jaeger span
    Explain {
        /// Path to a span JSON file, or - for stdin
        #[arg(long, conflicts_with = "sample", required_unless_present = "sample")]
        span: Option<String>,

        /// Name of a built-in sample span
        #[arg(long)]
        sample: Option<String>,

        /// Pretty-print the JSON response
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the built-in sample spans
    Samples,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Search {
            query,
            default_service,
            pretty,
        } => commands::search::run(&query, default_service.as_deref(), pretty).await,
        Commands::Explain {
            span,
            sample,
            pretty,
        } => commands::explain::run(span.as_deref(), sample.as_deref(), pretty).await,
        Commands::Samples => commands::samples::run(),
    }
}
