//! Error types for the export pipeline.
//!
//! Schema violations (empty header, row overflow) and registry misuse are
//! reported as dedicated variants. Every failure raised by a serializer
//! backend while writing an artifact is funnelled into [`CoreError::Export`],
//! which keeps the target path next to the original cause.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed backend error carried by [`CoreError::Export`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Custom error types for mediareport
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table schema error: {0}")]
    Schema(String),

    #[error("Export failed for '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("Can't found {0} format")]
    UnknownFormat(String),

    #[error("{0} was previously registered")]
    DuplicateFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl CoreError {
    /// Wraps a backend failure together with the artifact path it was writing.
    pub fn export(path: impl Into<PathBuf>, source: impl Into<BoxedError>) -> Self {
        CoreError::Export {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result type for mediareport operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Attaches the artifact path to any backend error.
pub trait ExportContext<T> {
    fn export_context(self, path: &Path) -> CoreResult<T>;
}

impl<T, E> ExportContext<T> for std::result::Result<T, E>
where
    E: Into<BoxedError>,
{
    fn export_context(self, path: &Path) -> CoreResult<T> {
        self.map_err(|e| CoreError::export(path, e))
    }
}
