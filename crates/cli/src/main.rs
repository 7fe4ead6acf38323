//! skiff - credential-aware AWS object storage client
//!
//! A command-line interface over the skiff services: caller identity,
//! bucket access checks and object list/get/put/rm.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skiff_cli::commands::{self, Cli};

/// Filter applied when neither flags nor `RUST_LOG` choose one
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.global.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
