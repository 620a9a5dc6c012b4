//! Domus Server Library
//!
//! HTTP server for a real-estate catalog with a bulk-import pipeline.
//!
//! # Overview
//!
//! - **Bulk import**: streaming JSON upload of flats, written in chunked
//!   batches inside one transaction, archived to S3-compatible storage, with
//!   a durable audit row per attempt (`ingest` module)
//! - **API Endpoints**: houses (the foreign-key target), upload history, and
//!   archive download
//! - **Database**: PostgreSQL via SQLx
//! - **Storage Backend**: S3-compatible blob storage behind the
//!   [`storage::BlobStore`] trait
//!
//! # Architecture
//!
//! Feature modules follow a CQRS layout: each feature is a vertical slice
//! with its own `commands/`, `queries/`, and `routes.rs`. Write operations
//! live in commands, read operations in queries; both expose a `handle`
//! function taking the shared state and a validated command/query value.
//!
//! The import pipeline is the hard core: it must succeed or fail as one
//! atomic unit across the relational store and the blob store, and every
//! attempt leaves exactly one `upload_history` row behind: SUCCESS committed
//! inside the attempt's transaction, or FAILURE written outside it after
//! rollback. See the `ingest` module docs for the ordering argument.

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use error::{AppError, AppResult};
