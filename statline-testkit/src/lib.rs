//! Statline Testkit
//!
//! Shared fixtures for the workspace test suites: event builders and a
//! fully wired in-memory pipeline.

#![warn(clippy::all)]

pub mod helpers;

pub use helpers::{counting_event, memory_pipeline, shot, substitution, ts};
