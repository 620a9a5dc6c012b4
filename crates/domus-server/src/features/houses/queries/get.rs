//! Get house query.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::House;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHouseQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetHouseError {
    #[error("House with id {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<House, GetHouseError>> for GetHouseQuery {}

impl crate::cqrs::middleware::Query for GetHouseQuery {}

#[tracing::instrument(skip(pool), fields(id = query.id))]
pub async fn handle(pool: PgPool, query: GetHouseQuery) -> Result<House, GetHouseError> {
    sqlx::query_as::<_, House>(
        "SELECT id, name, year, number_of_flats_on_floor, created_by, created_at \
         FROM houses WHERE id = $1",
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetHouseError::NotFound(query.id))
}
