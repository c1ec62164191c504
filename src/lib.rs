//! Autoscan: a tolerant but precise parser for VCDS auto-scan reports.
//!
//! A report goes through three stages:
//!
//! 1. [`syntax::parse`] turns the text into a raw tree, or a syntax error
//!    pointing at the offending span;
//! 2. [`hydrate::hydrate`] turns the raw tree into an immutable
//!    [`model::Report`];
//! 3. [`validation::validate`] checks the document against the bundled
//!    schema and reports every violation.
//!
//! [`pipeline::process`] chains the stages for one file and
//! [`pipeline::process_all`] runs a batch concurrently.

pub use crate::diagnostics::{ReportError, Stage};
pub use crate::model::Report;
pub use crate::pipeline::{process, process_all, sort_by_mileage, ReportFile};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod hydrate;
pub mod model;
pub mod pipeline;
pub mod syntax;
pub mod validation;
