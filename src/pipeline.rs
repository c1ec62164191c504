//! Report pipeline: parse, hydrate, validate.
//!
//! Each file runs through `Parsing -> Hydrating -> Validating -> Done`. Any
//! failing stage ends the run with that stage's [`ReportError`]; nothing is
//! retried. Runs share no state, so a batch fans out over a rayon pool and
//! the caller orders the results once all of them are in.

use std::cmp::Ordering;

use rayon::prelude::*;
use rayon::ThreadPoolBuildError;
use tracing::{debug, error, info, warn};

use crate::diagnostics::{ReportError, Stage};
use crate::hydrate::hydrate;
use crate::model::Report;
use crate::syntax::parse;
use crate::validation::validate;

/// The outcome of running one file through the pipeline.
#[derive(Debug)]
pub struct ReportFile {
    filename: String,
    outcome: Result<Report, ReportError>,
}

impl ReportFile {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn outcome(&self) -> Result<&Report, &ReportError> {
        self.outcome.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ReportError> {
        self.outcome.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> Result<Report, ReportError> {
        self.outcome
    }
}

/// Runs one report through every stage.
///
/// `filename` only labels errors; it is never opened.
pub fn process(filename: &str, text: &str) -> ReportFile {
    let outcome = run(filename, text);
    debug!(filename, stage = %Stage::Done, ok = outcome.is_ok(), "pipeline finished");
    ReportFile {
        filename: filename.to_string(),
        outcome,
    }
}

fn run(filename: &str, text: &str) -> Result<Report, ReportError> {
    debug!(filename, stage = %Stage::Parsing, bytes = text.len());
    let raw = parse(text).map_err(|e| {
        warn!(
            filename,
            line = e.location.start.line,
            column = e.location.start.column,
            "syntax error: {}",
            e.message
        );
        ReportError::syntax(filename, text, e)
    })?;

    debug!(filename, stage = %Stage::Hydrating);
    let report = hydrate(&raw).map_err(|e| {
        error!(
            filename,
            path = e.path(),
            "parser and document model are out of sync: {e}"
        );
        ReportError::hydration(filename, e)
    })?;

    debug!(filename, stage = %Stage::Validating, modules = report.modules().len());
    validate(&report).map_err(|e| {
        warn!(filename, violations = e.violations.len(), "report violates the schema");
        ReportError::validation(filename, e)
    })?;

    Ok(report)
}

/// Runs every `(filename, text)` pair through the pipeline concurrently.
///
/// `threads == 0` uses rayon's global pool. Results come back in input
/// order; use [`sort_by_mileage`] for display order.
pub fn process_all(
    files: &[(String, String)],
    threads: usize,
) -> Result<Vec<ReportFile>, ThreadPoolBuildError> {
    let run_all = || -> Vec<ReportFile> {
        files
            .par_iter()
            .map(|(filename, text)| process(filename, text))
            .collect()
    };

    let results = if threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        pool.install(run_all)
    } else {
        run_all()
    };

    let failed = results.iter().filter(|file| !file.is_ok()).count();
    let defects = results
        .iter()
        .filter(|file| file.error().is_some_and(ReportError::is_defect))
        .count();
    info!(
        files = results.len(),
        failed,
        defects,
        "batch processed"
    );

    Ok(results)
}

/// Orders files for display: highest mileage first, failed files last,
/// ties broken by filename.
pub fn sort_by_mileage(files: &mut [ReportFile]) {
    files.sort_by(compare_by_mileage);
}

fn compare_by_mileage(a: &ReportFile, b: &ReportFile) -> Ordering {
    let km = |file: &ReportFile| file.report().map(|report| report.vehicle().mileage().km());
    match (km(a), km(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.filename.cmp(&b.filename))
}
