//! Bulk flat import command.
//!
//! Thin wrapper around the import pipeline; the heavy lifting lives in
//! [`crate::ingest`].

use mediator::Request;

use super::ImportFileError;
use crate::config::ImportConfig;
use crate::ingest::{self, ImportOutcome};
use crate::storage::BlobStore;
use sqlx::PgPool;

/// Command to import a JSON array of flats from an uploaded file.
#[derive(Debug, Clone)]
pub struct ImportFlatsCommand {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub uploaded_by: String,
}

impl Request<Result<ImportOutcome, ImportFileError>> for ImportFlatsCommand {}

impl crate::cqrs::middleware::Command for ImportFlatsCommand {}

/// Handler for the flat import command.
#[tracing::instrument(
    skip(pool, blobs, config, command),
    fields(file_name = %command.file_name, size = command.data.len())
)]
pub async fn handle(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    command: ImportFlatsCommand,
) -> Result<ImportOutcome, ImportFileError> {
    ingest::import_flats_from_json(
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
