//! Per-file pipeline errors.
//!
//! A report either becomes a document or fails with exactly one
//! [`ReportError`]:
//!
//! - **Syntax**: the text does not match the auto-scan format. Carries the
//!   precise span and a rendered context excerpt.
//! - **Hydration**: the parser produced a tree the document model does not
//!   accept. This is a parser defect, never a problem with the report.
//! - **Validation**: the document is well-formed but breaks schema
//!   constraints. Carries every violation.
//!
//! `ReportError` implements [`miette::Diagnostic`] for terminal output and
//! serializes to a tagged object (`kind`) for machine consumers.

pub mod context;

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::hydrate::HydrationError;
use crate::syntax::{Location, SyntaxError};
use crate::validation::{ValidationError, Violation};

/// Pipeline stage of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parsing,
    Hydrating,
    Validating,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Parsing => "parsing",
            Stage::Hydrating => "hydrating",
            Stage::Validating => "validating",
            Stage::Done => "done",
        })
    }
}

/// Why a report could not be turned into a document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{filename}: syntax error: {error}")]
    Syntax {
        filename: String,
        error: SyntaxError,
        rendered_context: String,
        text: Arc<NamedSource<String>>,
    },
    #[error("{filename}: parser defect: {error}")]
    Hydration {
        filename: String,
        error: HydrationError,
    },
    #[error("{filename}: {error}")]
    Validation {
        filename: String,
        error: ValidationError,
    },
}

impl ReportError {
    pub fn syntax(filename: &str, text: &str, error: SyntaxError) -> Self {
        ReportError::Syntax {
            filename: filename.to_string(),
            rendered_context: context::render(text, &error.location),
            error,
            text: Arc::new(NamedSource::new(filename, text.to_string())),
        }
    }

    pub fn hydration(filename: &str, error: HydrationError) -> Self {
        ReportError::Hydration {
            filename: filename.to_string(),
            error,
        }
    }

    pub fn validation(filename: &str, error: ValidationError) -> Self {
        ReportError::Validation {
            filename: filename.to_string(),
            error,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            ReportError::Syntax { filename, .. }
            | ReportError::Hydration { filename, .. }
            | ReportError::Validation { filename, .. } => filename,
        }
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ReportError::Syntax { .. } => Stage::Parsing,
            ReportError::Hydration { .. } => Stage::Hydrating,
            ReportError::Validation { .. } => Stage::Validating,
        }
    }

    /// Whether the failure lies with the parser rather than the report.
    pub fn is_defect(&self) -> bool {
        matches!(self, ReportError::Hydration { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Syntax { .. } => "syntax",
            ReportError::Hydration { .. } => "hydration",
            ReportError::Validation { .. } => "validation",
        }
    }

    /// The rendered excerpt of a syntax error.
    pub fn rendered_context(&self) -> Option<&str> {
        match self {
            ReportError::Syntax {
                rendered_context, ..
            } => Some(rendered_context),
            _ => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ReportError::Validation { error, .. } => &error.violations,
            _ => &[],
        }
    }
}

impl Diagnostic for ReportError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("autoscan::{}", self.kind())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            ReportError::Syntax { .. } => {
                "the report text does not match the auto-scan format; see the context above".to_string()
            }
            ReportError::Hydration { .. } => {
                "this is NOT related to the vehicle: the parser and the document model are out of sync"
                    .to_string()
            }
            ReportError::Validation { error, .. } => error
                .violations
                .iter()
                .map(Violation::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            ReportError::Syntax { text, .. } => Some(text.as_ref() as &dyn SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            ReportError::Syntax { error, .. } => {
                let Location { start, .. } = error.location;
                let label =
                    LabeledSpan::new(Some(error.message.clone()), start.offset, error.location.len());
                Some(Box::new(std::iter::once(label)))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ErrorView<'a> {
    #[serde(rename_all = "camelCase")]
    Syntax {
        filename: &'a str,
        message: &'a str,
        location: &'a Location,
        rendered_context: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Hydration {
        filename: &'a str,
        message: String,
        path: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Validation {
        filename: &'a str,
        violations: &'a [Violation],
    },
}

impl Serialize for ReportError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = match self {
            ReportError::Syntax {
                filename,
                error,
                rendered_context,
                ..
            } => ErrorView::Syntax {
                filename,
                message: &error.message,
                location: &error.location,
                rendered_context,
            },
            ReportError::Hydration { filename, error } => ErrorView::Hydration {
                filename,
                message: error.to_string(),
                path: error.path(),
            },
            ReportError::Validation { filename, error } => ErrorView::Validation {
                filename,
                violations: &error.violations,
            },
        };
        view.serialize(serializer)
    }
}
