//! Audit history listing.
//!
//! Filter parameters are strict: an unrecognized query key or an unlisted
//! sort column is a client error, not a silently ignored one.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::models::{UploadHistory, UploadHistoryRow, UploadStatus};
use sqlx::PgPool;

/// Columns the history listing may sort by.
const SORTABLE_COLUMNS: &[&str] = &["id", "file_name", "entity_name", "uploaded", "uploaded_at", "status"];

/// Query over upload history rows.
///
/// `deny_unknown_fields` rejects misspelled filters outright; pagination
/// fields are therefore inlined rather than flattened.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ListUploadsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,

    /// Exact match on attempt status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UploadStatus>,

    /// Exact match on the imported entity name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Case-insensitive substring match on the original file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_contains: Option<String>,

    /// Sort column, one of [`SORTABLE_COLUMNS`]. Defaults to `uploaded_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// `asc` or `desc`. Defaults to `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListUploadsError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),

    #[error("Cannot sort by '{0}'")]
    UnsortableColumn(String),

    #[error("Order must be 'asc' or 'desc', got '{0}'")]
    InvalidOrder(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<UploadHistory>, ListUploadsError>> for ListUploadsQuery {}

impl crate::cqrs::middleware::Query for ListUploadsQuery {}

impl ListUploadsQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    /// Resolve the ORDER BY column against the whitelist. The value is
    /// interpolated into SQL, so it must come from this fixed set.
    fn sort_column(&self) -> Result<&'static str, ListUploadsError> {
        match self.sort_by.as_deref() {
            None => Ok("uploaded_at"),
            Some(requested) => SORTABLE_COLUMNS
                .iter()
                .find(|col| **col == requested)
                .copied()
                .ok_or_else(|| ListUploadsError::UnsortableColumn(requested.to_string())),
        }
    }

    fn sort_direction(&self) -> Result<&'static str, ListUploadsError> {
        match self.order.as_deref() {
            None | Some("desc") => Ok("DESC"),
            Some("asc") => Ok("ASC"),
            Some(other) => Err(ListUploadsError::InvalidOrder(other.to_string())),
        }
    }
}

#[tracing::instrument(skip(pool, query), fields(page = ?query.page, status = ?query.status))]
pub async fn handle(
    pool: PgPool,
    query: ListUploadsQuery,
) -> Result<Paginated<UploadHistory>, ListUploadsError> {
    let pagination = query.pagination();
    pagination
        .validate()
        .map_err(ListUploadsError::InvalidPagination)?;

    let sort_column = query.sort_column()?;
    let sort_direction = query.sort_direction()?;

    let file_pattern = query
        .file_name_contains
        .as_deref()
        .map(|n| format!("%{}%", n));

    let mut count: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM upload_history WHERE TRUE");
    push_filters(&mut count, &query, &file_pattern);
    let total: i64 = count.build_query_scalar().fetch_one(&pool).await?;

    let mut select: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, file_name, entity_name, uploaded, uploaded_at, status, error_message, uploaded_by \
         FROM upload_history WHERE TRUE",
    );
    push_filters(&mut select, &query, &file_pattern);
    select.push(format!(" ORDER BY {} {}", sort_column, sort_direction));
    select.push(" LIMIT ");
    select.push_bind(pagination.per_page());
    select.push(" OFFSET ");
    select.push_bind(pagination.offset());

    let rows: Vec<UploadHistoryRow> = select.build_query_as().fetch_all(&pool).await?;
    let items = rows
        .into_iter()
        .map(UploadHistoryRow::into_history)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Paginated::from_items(items, &pagination, total))
}

fn push_filters(
    builder: &mut QueryBuilder<Postgres>,
    query: &ListUploadsQuery,
    file_pattern: &Option<String>,
) {
    if let Some(status) = query.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(entity) = &query.entity_name {
        builder.push(" AND entity_name = ");
        builder.push_bind(entity.clone());
    }
    if let Some(pattern) = file_pattern {
        builder.push(" AND file_name ILIKE ");
        builder.push_bind(pattern.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort() {
        let query = ListUploadsQuery::default();
        assert_eq!(query.sort_column().unwrap(), "uploaded_at");
        assert_eq!(query.sort_direction().unwrap(), "DESC");
    }

    #[test]
    fn test_sort_whitelist() {
        let mut query = ListUploadsQuery::default();
        query.sort_by = Some("file_name".to_string());
        assert_eq!(query.sort_column().unwrap(), "file_name");

        query.sort_by = Some("error_message; DROP TABLE flats".to_string());
        assert!(matches!(
            query.sort_column(),
            Err(ListUploadsError::UnsortableColumn(_))
        ));
    }

    #[test]
    fn test_order_validation() {
        let mut query = ListUploadsQuery::default();
        query.order = Some("asc".to_string());
        assert_eq!(query.sort_direction().unwrap(), "ASC");

        query.order = Some("sideways".to_string());
        assert!(matches!(
            query.sort_direction(),
            Err(ListUploadsError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_unknown_filter_key_rejected() {
        let result: Result<ListUploadsQuery, _> =
            serde_json::from_str(r#"{"page": 1, "stauts": "SUCCESS"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_known_filters_accepted() {
        let query: ListUploadsQuery = serde_json::from_str(
            r#"{"page": 2, "per_page": 10, "status": "FAILURE", "file_name_contains": "flats"}"#,
        )
        .unwrap();
        assert_eq!(query.status, Some(UploadStatus::Failure));
        assert_eq!(query.file_name_contains.as_deref(), Some("flats"));
    }
}
