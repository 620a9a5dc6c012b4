//! Bulk house import command.

use mediator::Request;

use super::ImportFileError;
use crate::config::ImportConfig;
use crate::ingest::{self, ImportOutcome};
use crate::storage::BlobStore;
use sqlx::PgPool;

/// Command to import a JSON array of houses from an uploaded file.
#[derive(Debug, Clone)]
pub struct ImportHousesCommand {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub uploaded_by: String,
}

impl Request<Result<ImportOutcome, ImportFileError>> for ImportHousesCommand {}

impl crate::cqrs::middleware::Command for ImportHousesCommand {}

/// Handler for the house import command.
#[tracing::instrument(
    skip(pool, blobs, config, command),
    fields(file_name = %command.file_name, size = command.data.len())
)]
pub async fn handle(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    command: ImportHousesCommand,
) -> Result<ImportOutcome, ImportFileError> {
    ingest::import_houses_from_json(
        pool,
        blobs,
        config,
        &command.file_name,
        command.content_type.as_deref(),
        &command.data,
        &command.uploaded_by,
    )
    .await
    .map_err(|failure| ImportFileError {
        error: failure.error,
        history: failure.history,
    })
}
