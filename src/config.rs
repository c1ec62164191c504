//! Runtime configuration for the `autoscan` command.
//!
//! # Config file: `autoscan.toml`
//!
//! Looked up in the working directory, or given explicitly with `--config`:
//!
//! ```toml
//! threads = 4              # 0 = all cores
//! extensions = ["txt"]     # empty = every file
//! format = "json"          # or "text"
//! ```
//!
//! All fields are optional; missing ones keep their defaults. Command-line
//! flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "autoscan.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// TOML-friendly intermediate representation (all fields optional).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    threads: Option<usize>,
    extensions: Option<Vec<String>>,
    format: Option<OutputFormat>,
}

/// Runtime configuration.
///
/// | Setting | Default |
/// |---------|---------|
/// | `threads` | `0` (all cores) |
/// | `extensions` | `["txt"]` |
/// | `format` | `text` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Worker threads for batch runs; `0` uses rayon's default.
    pub threads: usize,
    /// File extensions picked up in a directory, compared case-insensitively.
    pub extensions: Vec<String>,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            extensions: vec!["txt".to_string()],
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(autoscan::config::read))]
    Read {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("failed to parse config file {}: {cause}", path.display())]
    #[diagnostic(code(autoscan::config::parse))]
    Parse {
        path: PathBuf,
        cause: toml::de::Error,
    },
}

impl Config {
    /// Loads `explicit` if given, else `autoscan.toml` from `dir` if present.
    ///
    /// Returns [`Config::default()`] when no file is found.
    pub fn load(explicit: Option<&Path>, dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = dir.as_ref().join(CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(&local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|cause| ConfigError::Read {
            path: path.to_path_buf(),
            cause,
        })?;
        Self::from_toml(&content).map_err(|cause| ConfigError::Parse {
            path: path.to_path_buf(),
            cause,
        })
    }

    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(threads) = file.threads {
            config.threads = threads;
        }
        if let Some(extensions) = file.extensions {
            config.extensions = extensions;
        }
        if let Some(format) = file.format {
            config.format = format;
        }
        Ok(config)
    }

    /// Whether a file should be picked up when scanning a directory.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(extension))
            })
    }
}
