mod cli;
mod config;
mod error;
mod model;
mod store;
mod sync;
mod util;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use error::exit_codes;

const DEFAULT_LOG_FILTER: &str = "bts_sync=info";

fn init_tracing() {
    // RUST_LOG wins when it parses; progress output stays on by default.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let summary = match cli.run().await {
        Ok(summary) => summary,
        Err(err) => {
            if err.is_transport() {
                tracing::error!(error = %err, "sync aborted; remaining tasks were not updated");
            }
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    };

    if let Err(err) = cli::print_summary(&summary, cli.json) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_codes::OPERATION_FAILED);
    }
    std::process::exit(exit_codes::SUCCESS);
}
