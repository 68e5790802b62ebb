//! Nutrition Insights Server Library
//!
//! This library exposes the internal modules for the binaries and the
//! integration tests.

pub mod config;
pub mod dataset;
pub mod server;

// Re-export commonly used types for convenience
pub use dataset::{DataSource, DatasetError, Table};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
