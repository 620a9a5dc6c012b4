//! Bulk import of flats and houses from uploaded JSON array files.
//!
//! One call to [`import_flats_from_json`] or [`import_houses_from_json`] is
//! one attempt. An attempt either commits everything (all records, the
//! SUCCESS audit row, the archived original bytes) or leaves nothing behind
//! except a FAILURE audit row.

pub mod error;
pub mod history;
pub mod parser;
pub mod record;
pub mod writer;

use crate::config::ImportConfig;
use crate::models::UploadHistory;
use crate::storage::{upload_key, BlobStore};
use error::ImportError;
use parser::{FlatRecordStream, HouseRecordStream};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info, instrument};
use writer::{ChunkedFlatWriter, ChunkedHouseWriter};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Outcome of a successful attempt.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub history: UploadHistory,
    pub uploaded: i64,
}

/// Outcome of a failed attempt. `history` is the FAILURE audit row, absent
/// only if even the audit insert failed.
#[derive(Debug)]
pub struct ImportFailure {
    pub error: ImportError,
    pub history: Option<UploadHistory>,
}

/// Run one flat import attempt end to end.
///
/// Ordering inside the attempt is what makes it atomic: records and the
/// SUCCESS audit row are written in one transaction, the original bytes are
/// archived under the audit row's id, and only then does the transaction
/// commit. A failure at any point drops the transaction, rolls everything
/// back, and records a FAILURE row outside it.
#[instrument(skip(pool, blobs, config, content_type, data), fields(size = data.len()))]
pub async fn import_flats_from_json(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    uploaded_by: &str,
) -> Result<ImportOutcome, ImportFailure> {
    let attempt =
        run_flat_attempt(pool, blobs, config, file_name, content_type, data, uploaded_by).await;
    conclude_attempt(pool, history::ENTITY_FLAT, file_name, uploaded_by, attempt).await
}

/// Run one house import attempt end to end, with the same atomicity
/// guarantees as the flat import.
#[instrument(skip(pool, blobs, config, content_type, data), fields(size = data.len()))]
pub async fn import_houses_from_json(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    uploaded_by: &str,
) -> Result<ImportOutcome, ImportFailure> {
    let attempt =
        run_house_attempt(pool, blobs, config, file_name, content_type, data, uploaded_by).await;
    conclude_attempt(pool, history::ENTITY_HOUSE, file_name, uploaded_by, attempt).await
}

/// Log the attempt's outcome and, on failure, record the FAILURE audit row
/// outside the already-dropped transaction.
async fn conclude_attempt(
    pool: &PgPool,
    entity_name: &str,
    file_name: &str,
    uploaded_by: &str,
    attempt: Result<ImportOutcome, ImportError>,
) -> Result<ImportOutcome, ImportFailure> {
    match attempt {
        Ok(outcome) => {
            info!(
                file_name,
                entity_name,
                uploaded = outcome.uploaded,
                history_id = outcome.history.id,
                "Import succeeded"
            );
            Ok(outcome)
        },
        Err(import_error) => {
            error!(
                file_name,
                entity_name,
                kind = import_error.kind().as_str(),
                error = %import_error,
                "Import failed"
            );
            let history =
                history::insert_failure(pool, file_name, entity_name, &import_error, uploaded_by)
                    .await;
            Err(ImportFailure {
                error: import_error,
                history,
            })
        },
    }
}

async fn run_flat_attempt(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    uploaded_by: &str,
) -> Result<ImportOutcome, ImportError> {
    check_file_name(file_name)?;

    let mut stream = FlatRecordStream::new(data)?;

    let mut tx = pool.begin().await?;

    let mut writer = ChunkedFlatWriter::new(config.chunk_size, uploaded_by);
    while let Some(record) = stream.next_record()? {
        writer.push(&mut tx, record).await?;
    }
    writer.flush(&mut tx).await?;
    let uploaded = writer.written();

    let history =
        history::insert_success(&mut tx, file_name, history::ENTITY_FLAT, uploaded, uploaded_by)
            .await?;

    // Archive before commit: if the blob write fails, the transaction (and
    // with it the SUCCESS row whose id keys the blob) is rolled back.
    archive_original(blobs, config, &history, content_type, data).await?;

    tx.commit().await?;

    Ok(ImportOutcome { history, uploaded })
}

async fn run_house_attempt(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    uploaded_by: &str,
) -> Result<ImportOutcome, ImportError> {
    check_file_name(file_name)?;

    let mut stream = HouseRecordStream::new(data)?;

    let mut tx = pool.begin().await?;

    let mut writer = ChunkedHouseWriter::new(config.chunk_size, uploaded_by);
    while let Some(record) = stream.next_record()? {
        writer.push(&mut tx, record).await?;
    }
    writer.flush(&mut tx).await?;
    let uploaded = writer.written();

    let history =
        history::insert_success(&mut tx, file_name, history::ENTITY_HOUSE, uploaded, uploaded_by)
            .await?;

    // Same ordering as the flat attempt: archive, then commit.
    archive_original(blobs, config, &history, content_type, data).await?;

    tx.commit().await?;

    Ok(ImportOutcome { history, uploaded })
}

fn check_file_name(file_name: &str) -> Result<(), ImportError> {
    if file_name.to_ascii_lowercase().ends_with(".json") {
        Ok(())
    } else {
        Err(ImportError::Structural(format!(
            "unsupported file type for '{}', expected a .json file",
            file_name
        )))
    }
}

/// Write the original upload bytes under the audit row's key, bounded by the
/// configured timeout.
async fn archive_original(
    blobs: &dyn BlobStore,
    config: &ImportConfig,
    history: &UploadHistory,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<(), ImportError> {
    let key = upload_key(history.id);
    let archive = blobs.put(
        &key,
        data.to_vec(),
        Some(content_type.unwrap_or(JSON_CONTENT_TYPE).to_string()),
    );

    match tokio::time::timeout(Duration::from_secs(config.archive_timeout_secs), archive).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ImportError::Storage(e.to_string())),
        Err(_) => Err(ImportError::Storage(format!(
            "archival write timed out after {}s",
            config.archive_timeout_secs
        ))),
    }
}
