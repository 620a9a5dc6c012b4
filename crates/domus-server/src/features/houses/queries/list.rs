//! List houses query.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::models::House;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListHousesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Case-insensitive substring match on the house name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListHousesError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<House>, ListHousesError>> for ListHousesQuery {}

impl crate::cqrs::middleware::Query for ListHousesQuery {}

#[tracing::instrument(skip(pool, query), fields(page = ?query.pagination.page))]
pub async fn handle(
    pool: PgPool,
    query: ListHousesQuery,
) -> Result<Paginated<House>, ListHousesError> {
    query
        .pagination
        .validate()
        .map_err(ListHousesError::InvalidPagination)?;

    let pattern = query
        .name_contains
        .as_deref()
        .map(|n| format!("%{}%", n));

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM houses WHERE ($1::text IS NULL OR name ILIKE $1)",
    )
    .bind(&pattern)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, House>(
        "SELECT id, name, year, number_of_flats_on_floor, created_by, created_at \
         FROM houses \
         WHERE ($1::text IS NULL OR name ILIKE $1) \
         ORDER BY id \
         LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(query.pagination.per_page())
    .bind(query.pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::from_items(items, &query.pagination, total))
}
