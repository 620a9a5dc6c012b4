//! Domus Common Library
//!
//! Shared error handling and logging setup for the Domus workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`DomusError`] type and [`Result`] alias
//! - **Logging**: env-driven `tracing` initialization shared by all binaries

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DomusError, Result};
