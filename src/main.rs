//! Music Shelf - command-line front end for the folder library.

use clap::Parser;
use music_shelf::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_shelf=info".parse()?))
        .init();

    cli::run_command(&args)
}
