//! Read operations for houses.

pub mod get;
pub mod list;

pub use get::{GetHouseError, GetHouseQuery};
pub use list::{ListHousesError, ListHousesQuery};
