//! Read operations for uploads.

pub mod download;
pub mod list;

pub use download::{DownloadUploadError, DownloadUploadQuery};
pub use list::{ListUploadsError, ListUploadsQuery};
