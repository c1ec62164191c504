use thiserror::Error;

/// The raw tree disagrees with the document templates.
///
/// This never describes a malformed report: well-formed text that the
/// grammar accepts must always hydrate. Every variant carries the JSON
/// pointer of the offending node in the raw tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
    #[error("unexpected key `{key}` in {template} at {}", at(.path))]
    UnexpectedKey {
        path: String,
        template: &'static str,
        key: String,
    },
    #[error("missing required key `{key}` in {template} at {}", at(.path))]
    MissingKey {
        path: String,
        template: &'static str,
        key: String,
    },
    #[error("expected {expected} at {}, found {found}", at(.path))]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid value at {}: {reason}", at(.path))]
    InvalidValue { path: String, reason: String },
    #[error("duplicate {entry} `{key}` at {}", at(.path))]
    DuplicateEntry {
        path: String,
        entry: &'static str,
        key: String,
    },
    #[error("inconsistent {template} at {}: {reason}", at(.path))]
    Inconsistent {
        path: String,
        template: &'static str,
        reason: String,
    },
    #[error("{template} at {} is already frozen", at(.path))]
    AlreadyFrozen {
        path: String,
        template: &'static str,
    },
}

impl HydrationError {
    /// JSON pointer of the offending node.
    pub fn path(&self) -> &str {
        match self {
            Self::UnexpectedKey { path, .. }
            | Self::MissingKey { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::DuplicateEntry { path, .. }
            | Self::Inconsistent { path, .. }
            | Self::AlreadyFrozen { path, .. } => path,
        }
    }
}

fn at(path: &str) -> &str {
    if path.is_empty() {
        "the document root"
    } else {
        path
    }
}
