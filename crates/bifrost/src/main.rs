use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use crate::cli::Run as _;

#[macro_use]
extern crate tracing;

mod cli;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    cli::Options::parse().run().await
}
