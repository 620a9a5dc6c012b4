//! Upload API routes.
//!
//! - `POST /api/v1/uploads/flats` - Bulk import flats from a JSON file
//! - `POST /api/v1/uploads/houses` - Bulk import houses from a JSON file
//! - `GET /api/v1/uploads` - List import attempts
//! - `GET /api/v1/uploads/:id/file` - Download the archived original file

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::principal;
use crate::features::FeatureState;
use crate::ingest::error::ImportErrorKind;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::commands::{ImportFileError, ImportFlatsCommand, ImportHousesCommand};
use super::queries::{DownloadUploadError, DownloadUploadQuery, ListUploadsError, ListUploadsQuery};

pub fn uploads_routes() -> Router<FeatureState> {
    Router::new()
        .route("/flats", post(import_flats))
        .route("/houses", post(import_houses))
        .route("/", get(list_uploads))
        .route("/:id/file", get(download_upload))
}

/// Import a JSON array of flats.
///
/// The file arrives as the `file` part of a multipart form. Responds with the
/// SUCCESS audit row on success; on failure, with the classified error and
/// the FAILURE audit row.
#[tracing::instrument(skip(state, headers, multipart))]
async fn import_flats(
    State(state): State<FeatureState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let uploaded_by = principal(&headers);
    let (file_name, content_type, data) = read_file_part(multipart).await?;

    tracing::info!(file_name, size = data.len(), uploaded_by, "Import requested");

    let command = ImportFlatsCommand {
        file_name,
        content_type,
        data,
        uploaded_by,
    };

    let outcome =
        super::commands::import::handle(&state.db, state.storage.as_ref(), &state.import, command)
            .await?;

    let meta = json!({ "uploaded": outcome.uploaded });

    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_meta(outcome.history, meta)))
        .into_response())
}

/// Import a JSON array of houses. Same contract as the flat import.
#[tracing::instrument(skip(state, headers, multipart))]
async fn import_houses(
    State(state): State<FeatureState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let uploaded_by = principal(&headers);
    let (file_name, content_type, data) = read_file_part(multipart).await?;

    tracing::info!(file_name, size = data.len(), uploaded_by, "House import requested");

    let command = ImportHousesCommand {
        file_name,
        content_type,
        data,
        uploaded_by,
    };

    let outcome = super::commands::import_houses::handle(
        &state.db,
        state.storage.as_ref(),
        &state.import,
        command,
    )
    .await?;

    let meta = json!({ "uploaded": outcome.uploaded });

    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_meta(outcome.history, meta)))
        .into_response())
}

#[tracing::instrument(skip(state, query))]
async fn list_uploads(
    State(state): State<FeatureState>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<Response, UploadApiError> {
    let page = super::queries::list::handle(state.db.clone(), query).await?;

    let meta = json!({ "pagination": page.pagination });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(page.items, meta))).into_response())
}

#[tracing::instrument(skip(state), fields(id = %id))]
async fn download_upload(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> Result<Response, UploadApiError> {
    let file = super::queries::download::handle(
        &state.db,
        state.storage.as_ref(),
        DownloadUploadQuery { history_id: id },
    )
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.data,
    )
        .into_response())
}

/// Pull the uploaded file out of the multipart body. Expects a part named
/// `file`; other parts are ignored.
async fn read_file_part(
    mut multipart: Multipart,
) -> Result<(String, Option<String>, Vec<u8>), UploadApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadApiError::BadMultipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| UploadApiError::BadMultipart("file part has no filename".into()))?;

        let content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| UploadApiError::BadMultipart(e.to_string()))?
            .to_vec();

        return Ok((file_name, content_type, data));
    }

    Err(UploadApiError::BadMultipart(
        "multipart body has no 'file' part".into(),
    ))
}

/// Unified error type for upload API endpoints.
#[derive(Debug)]
enum UploadApiError {
    BadMultipart(String),
    Import(ImportFileError),
    List(ListUploadsError),
    Download(DownloadUploadError),
}

impl From<ImportFileError> for UploadApiError {
    fn from(err: ImportFileError) -> Self {
        Self::Import(err)
    }
}

impl From<ListUploadsError> for UploadApiError {
    fn from(err: ListUploadsError) -> Self {
        Self::List(err)
    }
}

impl From<DownloadUploadError> for UploadApiError {
    fn from(err: DownloadUploadError) -> Self {
        Self::Download(err)
    }
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        match self {
            UploadApiError::BadMultipart(message) => {
                let error = ErrorResponse::new("BAD_REQUEST", message);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Import(failed) => {
                let kind = failed.error.kind();
                let status = match kind {
                    ImportErrorKind::Structural
                    | ImportErrorKind::Validation
                    | ImportErrorKind::Referential => StatusCode::UNPROCESSABLE_ENTITY,
                    ImportErrorKind::Storage => StatusCode::BAD_GATEWAY,
                    ImportErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let details = json!({ "history": failed.history });
                let error = ErrorResponse::with_details(
                    kind.as_str(),
                    failed.error.to_string(),
                    details,
                );
                (status, Json(error)).into_response()
            },
            UploadApiError::List(ListUploadsError::InvalidPagination(_))
            | UploadApiError::List(ListUploadsError::UnsortableColumn(_))
            | UploadApiError::List(ListUploadsError::InvalidOrder(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Download(DownloadUploadError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            UploadApiError::Download(DownloadUploadError::NotArchived(_)) => {
                let error = ErrorResponse::new("NOT_ARCHIVED", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            UploadApiError::Download(DownloadUploadError::Storage(_)) => {
                tracing::error!("Storage error serving archived upload: {}", self);
                let error = ErrorResponse::new("STORAGE_ERROR", "Could not read the archived file");
                (StatusCode::BAD_GATEWAY, Json(error)).into_response()
            },
            UploadApiError::List(ListUploadsError::Database(_))
            | UploadApiError::Download(DownloadUploadError::Database(_)) => {
                tracing::error!("Database error in uploads API: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for UploadApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMultipart(m) => write!(f, "{}", m),
            Self::Import(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
            Self::Download(e) => write!(f, "{}", e),
        }
    }
}
