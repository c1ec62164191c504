use std::process;

use autoscan::cli::{self, args::AutoscanArgs};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> miette::Result<()> {
    let args = AutoscanArgs::parse();

    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoscan=warn")),
        1 => EnvFilter::new("autoscan=debug"),
        _ => EnvFilter::new("autoscan=trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if !cli::run(args)? {
        process::exit(1);
    }
    Ok(())
}
