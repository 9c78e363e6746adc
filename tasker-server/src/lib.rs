//! `Tasker` development server library.
//!
//! Serves the `/tasks` REST collection from memory. Exposed as a library so
//! the client's integration tests can run it in-process.

pub mod api;
pub mod config;
pub mod store;
