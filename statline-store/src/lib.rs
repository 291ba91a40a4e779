//! Statline Storage Layer
//!
//! Relational persistence for game events and their derived statistics.
//!
//! # Architecture
//!
//! - **`StatStore` trait**: the storage interface (port)
//! - **In-memory store**: single-lock implementation for tests and development
//! - **PostgreSQL store**: production implementation (feature `postgres`)
//!
//! Every write goes through [`StatStore::apply_event`], which persists the
//! raw event and re-derives the per-game line and both season aggregates as
//! one atomic unit: either all four rows commit or none do.

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{init_schema, PgStatStore};
pub use repository::StatStore;
