//! Command-line arguments and subcommands of `autoscan`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "autoscan",
    version,
    about = "Parses and validates VCDS auto-scan reports."
)]
pub struct AutoscanArgs {
    /// Configuration file (defaults to ./autoscan.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log pipeline stages (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Worker threads for batch runs (0 = all cores).
    #[arg(long, global = true, value_name = "N")]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse, hydrate and validate one report.
    Parse {
        #[arg(required = true)]
        file: PathBuf,
        /// Print the document (or error) as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Process every report of a directory, highest mileage first.
    Batch {
        #[arg(required = true)]
        dir: PathBuf,
        /// Print the results as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Print the raw tree produced by the grammar.
    Tree {
        #[arg(required = true)]
        file: PathBuf,
    },
}
