//! API envelope types shared by all routes

pub mod response;
