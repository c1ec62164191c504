//! The `autoscan` command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the library functions: reading files, running the pipeline and printing
//! results.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::args::{AutoscanArgs, Command};
use crate::config::{Config, OutputFormat};
use crate::diagnostics::ReportError;
use crate::pipeline::{process, process_all, sort_by_mileage};
use crate::syntax;

pub mod args;
pub mod output;

/// Runs the command described by `args`.
///
/// Returns `Ok(false)` when at least one report failed; I/O and
/// configuration problems are errors.
pub fn run(args: AutoscanArgs) -> Result<bool> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let mut config = Config::load(args.config.as_deref(), &cwd)?;
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    debug!(?config, "configuration loaded");

    match args.command {
        Command::Parse { file, json } => handle_parse(&file, format(json, &config)),
        Command::Batch { dir, json } => handle_batch(&dir, format(json, &config), &config),
        Command::Tree { file } => handle_tree(&file),
    }
}

fn format(json_flag: bool, config: &Config) -> OutputFormat {
    if json_flag {
        OutputFormat::Json
    } else {
        config.format
    }
}

/// Handles the `parse` subcommand.
fn handle_parse(path: &Path, format: OutputFormat) -> Result<bool> {
    let text = read_report(path)?;
    let file = process(&display_name(path), &text);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output::file_json(&file)).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => match file.outcome() {
            Ok(report) => {
                output::print_report(&mut output::stdout(), file.filename(), report).into_diagnostic()?
            }
            Err(error) => output::print_error(&mut output::stderr(), error).into_diagnostic()?,
        },
    }
    Ok(file.is_ok())
}

/// Handles the `batch` subcommand.
fn handle_batch(dir: &Path, format: OutputFormat, config: &Config) -> Result<bool> {
    let files = collect_reports(dir, config)?;
    debug!(dir = %dir.display(), files = files.len(), "collected reports");

    let mut results = process_all(&files, config.threads)
        .into_diagnostic()
        .wrap_err("failed to start the worker pool")?;
    sort_by_mileage(&mut results);

    match format {
        OutputFormat::Json => {
            let values: Vec<_> = results.iter().map(output::file_json).collect();
            let json = serde_json::to_string_pretty(&values).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let mut out = output::stdout();
            for file in &results {
                output::print_batch_line(&mut out, file).into_diagnostic()?;
            }
            out.flush().into_diagnostic()?;
        }
    }
    Ok(results.iter().all(|file| file.is_ok()))
}

/// Handles the `tree` subcommand.
fn handle_tree(path: &Path) -> Result<bool> {
    let text = read_report(path)?;
    let name = display_name(path);
    let tree = syntax::parse(&text).map_err(|error| ReportError::syntax(&name, &text, error))?;
    println!("{}", serde_json::to_string_pretty(&tree).into_diagnostic()?);
    Ok(true)
}

/// Reads the matching files directly inside `dir`, sorted by path.
fn collect_reports(dir: &Path, config: &Config) -> Result<Vec<(String, String)>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && config.accepts(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| Ok((display_name(path), read_report(path)?)))
        .collect()
}

/// Reads a report, replacing invalid UTF-8 sequences.
fn read_report(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
