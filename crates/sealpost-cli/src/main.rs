//! Sealpost binary.

use std::io;

use clap::Parser;
use sealpost_cli::{Cli, run};
use sealpost_core::SystemEnv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    run(cli, &SystemEnv::new(), &mut input, &mut output)?;

    Ok(())
}
