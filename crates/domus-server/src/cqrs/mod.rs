//! CQRS plumbing
//!
//! Commands and queries implement `mediator::Request` plus one of the marker
//! traits below. Routes dispatch to the feature `handle` functions directly;
//! the markers keep the write/read split explicit and greppable.

pub use mediator::Request;

pub mod middleware;
