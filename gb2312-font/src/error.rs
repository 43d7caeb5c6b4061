//! Errors that abort a generator run.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// An error that stops generation.
///
/// Unassigned code positions are not errors; they are rendered as blank
/// placeholder glyphs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load font '{}': {reason}", .path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub(crate) fn font_load(path: &Path, reason: impl ToString) -> Self {
        Error::FontLoad {
            path: path.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_owned(),
            source,
        }
    }
}
