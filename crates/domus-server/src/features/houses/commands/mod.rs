//! Write operations for houses.

pub mod create;

pub use create::{CreateHouseCommand, CreateHouseError};
