//! GitHub explorer server library.
//!
//! Exposes the GitHub lookup procedures, the response cache in front of
//! them, and the data behind the search and details pages.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
