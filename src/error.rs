/// Application-level error type.
///
/// Module-local errors (`StorageError`, `StackError`, `RaceError`) stay
/// close to their modules; this enum collects what crosses into the
/// binary.

use thiserror::Error;

use crate::session::store::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
