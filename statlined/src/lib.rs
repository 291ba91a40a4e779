//! Statline Daemon
//!
//! HTTP front end of the ingestion pipeline: receives game events, drives
//! the event processor, and serves cached season statistics.

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;

pub use api::{create_router, ApiState};
pub use config::{ApiConfig, Config};
pub use error::{ServerError, ServerResult};
