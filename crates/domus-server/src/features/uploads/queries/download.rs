//! Retrieval of archived upload files.
//!
//! Only SUCCESS attempts have an archived blob; the blob key is derived from
//! the audit row id.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::{UploadHistoryRow, UploadStatus};
use crate::storage::{upload_key, BlobStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadUploadQuery {
    pub history_id: i64,
}

/// The archived file plus enough metadata to serve it.
#[derive(Debug, Clone)]
pub struct DownloadedUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadUploadError {
    #[error("Upload attempt {0} not found")]
    NotFound(i64),

    #[error("Upload attempt {0} failed; no file was archived")]
    NotArchived(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DownloadedUpload, DownloadUploadError>> for DownloadUploadQuery {}

impl crate::cqrs::middleware::Query for DownloadUploadQuery {}

#[tracing::instrument(skip(pool, blobs), fields(history_id = query.history_id))]
pub async fn handle(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    query: DownloadUploadQuery,
) -> Result<DownloadedUpload, DownloadUploadError> {
    let row = sqlx::query_as::<_, UploadHistoryRow>(
        "SELECT id, file_name, entity_name, uploaded, uploaded_at, status, error_message, uploaded_by \
         FROM upload_history WHERE id = $1",
    )
    .bind(query.history_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DownloadUploadError::NotFound(query.history_id))?;

    let history = row.into_history()?;

    if history.status != UploadStatus::Success {
        return Err(DownloadUploadError::NotArchived(query.history_id));
    }

    let key = upload_key(history.id);
    let metadata = blobs.metadata(&key).await?;
    let data = blobs.get(&key).await?;

    Ok(DownloadedUpload {
        file_name: history.file_name,
        content_type: metadata
            .content_type
            .unwrap_or_else(|| "application/json".to_string()),
        data,
    })
}
