//! House API routes.
//!
//! - `POST /api/v1/houses` - Create a house
//! - `GET /api/v1/houses` - List houses with pagination
//! - `GET /api/v1/houses/:id` - Get a single house

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::principal;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::commands::{CreateHouseCommand, CreateHouseError};
use super::queries::{GetHouseError, GetHouseQuery, ListHousesError, ListHousesQuery};

pub fn houses_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_house))
        .route("/", get(list_houses))
        .route("/:id", get(get_house))
}

#[tracing::instrument(skip(pool, headers, command), fields(name = %command.name))]
async fn create_house(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Json(mut command): Json<CreateHouseCommand>,
) -> Result<Response, HouseApiError> {
    command.created_by = principal(&headers);

    let house = super::commands::create::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(house))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn get_house(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Response, HouseApiError> {
    let house = super::queries::get::handle(pool, GetHouseQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(house))).into_response())
}

#[tracing::instrument(skip(pool, query), fields(page = ?query.pagination.page))]
async fn list_houses(
    State(pool): State<PgPool>,
    Query(query): Query<ListHousesQuery>,
) -> Result<Response, HouseApiError> {
    let page = super::queries::list::handle(pool, query).await?;

    let meta = json!({ "pagination": page.pagination });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(page.items, meta))).into_response())
}

/// Unified error type for house API endpoints.
#[derive(Debug)]
enum HouseApiError {
    Create(CreateHouseError),
    Get(GetHouseError),
    List(ListHousesError),
}

impl From<CreateHouseError> for HouseApiError {
    fn from(err: CreateHouseError) -> Self {
        Self::Create(err)
    }
}

impl From<GetHouseError> for HouseApiError {
    fn from(err: GetHouseError) -> Self {
        Self::Get(err)
    }
}

impl From<ListHousesError> for HouseApiError {
    fn from(err: ListHousesError) -> Self {
        Self::List(err)
    }
}

impl IntoResponse for HouseApiError {
    fn into_response(self) -> Response {
        match self {
            HouseApiError::Create(CreateHouseError::NameRequired)
            | HouseApiError::Create(CreateHouseError::YearOutOfRange)
            | HouseApiError::Create(CreateHouseError::FlatsOnFloorOutOfRange) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            HouseApiError::Get(GetHouseError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            HouseApiError::List(ListHousesError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            HouseApiError::Create(CreateHouseError::Database(_))
            | HouseApiError::Get(GetHouseError::Database(_))
            | HouseApiError::List(ListHousesError::Database(_)) => {
                tracing::error!("Database error in houses API: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for HouseApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = houses_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }

    #[test]
    fn test_error_display() {
        let err = HouseApiError::Create(CreateHouseError::NameRequired);
        assert!(err.to_string().contains("Name must not be empty"));
    }
}
