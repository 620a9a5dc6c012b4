//! Feature modules implementing the HTTP API.
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//!
//! - **houses**: Management of houses, the foreign-key targets of imports
//! - **uploads**: Bulk import of flats, audit history, archived file download
//!
//! Commands and queries implement the mediator `Request` trait so handlers
//! stay standalone functions over plain data.

pub mod houses;
pub mod shared;
pub mod uploads;

use crate::config::ImportConfig;
use crate::storage::BlobStore;
use axum::Router;
use std::sync::Arc;

/// Shared state for all feature routes.
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool.
    pub db: sqlx::PgPool,
    /// Archival blob store.
    pub storage: Arc<dyn BlobStore>,
    /// Import pipeline tuning.
    pub import: ImportConfig,
}

/// Main API router with all feature routes mounted.
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/houses", houses::houses_routes().with_state(state.db.clone()))
        .nest("/uploads", uploads::uploads_routes().with_state(state))
}
