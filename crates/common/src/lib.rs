//! Fuglelitt Common Library
//!
//! Shared code for the Fuglelitt services including:
//! - Catalog entities, storage and write workflows
//! - Slug assignment
//! - Error types and handling
//! - Configuration management
//! - Request identity
//! - Metrics and observability

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod slugs;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogStore, Lookup, MemoryStore};
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
