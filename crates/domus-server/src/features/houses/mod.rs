//! Houses feature slice.
//!
//! Houses are the foreign-key targets of imported flats; a bulk import can
//! only succeed against houses created here first.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::houses_routes;
