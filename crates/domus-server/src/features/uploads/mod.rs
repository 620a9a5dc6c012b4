//! Uploads feature slice.
//!
//! Covers the bulk import endpoint, the audit history listing, and retrieval
//! of archived upload files.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::uploads_routes;
