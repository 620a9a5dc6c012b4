//! Write operations for uploads.

pub mod import;
pub mod import_houses;

pub use import::ImportFlatsCommand;
pub use import_houses::ImportHousesCommand;

use crate::ingest::error::ImportError;
use crate::models::UploadHistory;

/// Import failure as seen by the API layer: the classified pipeline error
/// plus the FAILURE audit row, when one could be written.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ImportFileError {
    pub error: ImportError,
    pub history: Option<UploadHistory>,
}
