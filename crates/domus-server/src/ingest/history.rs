//! Writing upload_history audit rows.
//!
//! SUCCESS rows are written inside the import transaction so they commit or
//! vanish together with the imported records. FAILURE rows are written on the
//! pool, after the transaction is gone, so a rolled-back attempt still leaves
//! its audit trail.

use crate::ingest::error::ImportError;
use crate::models::{UploadHistory, UploadHistoryRow, UploadStatus};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

pub const ENTITY_FLAT: &str = "Flat";
pub const ENTITY_HOUSE: &str = "House";

/// Insert the SUCCESS audit row for a finished attempt. Runs inside `tx`;
/// the returned id keys the archived blob.
pub async fn insert_success(
    tx: &mut Transaction<'_, Postgres>,
    file_name: &str,
    entity_name: &str,
    uploaded: i64,
    uploaded_by: &str,
) -> Result<UploadHistory, ImportError> {
    let row = sqlx::query_as::<_, UploadHistoryRow>(
        r#"
        INSERT INTO upload_history (file_name, entity_name, uploaded, status, uploaded_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, file_name, entity_name, uploaded, uploaded_at, status, error_message, uploaded_by
        "#,
    )
    .bind(file_name)
    .bind(entity_name)
    .bind(uploaded)
    .bind(UploadStatus::Success.as_str())
    .bind(uploaded_by)
    .fetch_one(&mut **tx)
    .await?;

    row.into_history().map_err(ImportError::from)
}

/// Insert the FAILURE audit row for a failed attempt. Runs on the pool so it
/// survives the rollback of the import transaction. If even this insert
/// fails, the error is logged and swallowed; the caller still reports the
/// original failure.
pub async fn insert_failure(
    pool: &PgPool,
    file_name: &str,
    entity_name: &str,
    error: &ImportError,
    uploaded_by: &str,
) -> Option<UploadHistory> {
    let result = sqlx::query_as::<_, UploadHistoryRow>(
        r#"
        INSERT INTO upload_history (file_name, entity_name, uploaded, status, error_message, uploaded_by)
        VALUES ($1, $2, 0, $3, $4, $5)
        RETURNING id, file_name, entity_name, uploaded, uploaded_at, status, error_message, uploaded_by
        "#,
    )
    .bind(file_name)
    .bind(entity_name)
    .bind(UploadStatus::Failure.as_str())
    .bind(format!("{}: {}", error.kind().as_str(), error))
    .bind(uploaded_by)
    .fetch_one(pool)
    .await;

    match result.and_then(UploadHistoryRow::into_history) {
        Ok(history) => Some(history),
        Err(e) => {
            warn!(error = %e, file_name, "Could not record failed upload attempt");
            None
        },
    }
}
