//! Binary crate for the `deck-weather` terminal host.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Standing in for the control-surface host (settings, rendering)
//! - Forwarding lifecycle events to the core scheduler

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries rendered key faces.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deck_weather=info,deck_weather_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
