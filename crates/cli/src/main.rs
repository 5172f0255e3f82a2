//! s3search - find object keys across S3 buckets
//!
//! Lists every accessible bucket (optionally filtered by name), scans each
//! one for keys containing a search term, and prints the matches.

mod commands;
mod exit_code;
mod output;
mod pipeline;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::search::SearchArgs;
use crate::output::OutputConfig;

/// Search S3 object keys for a substring
#[derive(Parser, Debug)]
#[command(name = "s3search", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// Suppress warnings and the progress spinner
    #[arg(short, long)]
    quiet: bool,

    /// Log debug details to stderr (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let output_config = OutputConfig {
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    let code = commands::search::execute(cli.search, output_config).await;
    std::process::exit(code.as_i32());
}

/// Send logs to stderr so they never mix with results on stdout
fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,s3search={level},ss_core={level},ss_s3={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
