use std::path::Path;

use thiserror::Error;

/// Errors raised by the artifact store and variant encoder.
///
/// These never cross the publisher boundary: the engine reports every
/// documented failure through its outcome records and logs the underlying
/// error instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact content is empty")]
    EmptyContent,
    #[error("artifact path `{path}` is not writable inside the cache root")]
    InvalidPath { path: String },
    #[error("artifact `{path}` missing after atomic move")]
    MissingAfterMove { path: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn invalid_path(path: &Path) -> Self {
        Self::InvalidPath {
            path: path.display().to_string(),
        }
    }

    pub fn missing_after_move(path: &Path) -> Self {
        Self::MissingAfterMove {
            path: path.display().to_string(),
        }
    }
}
