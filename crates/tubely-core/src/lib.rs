//! Tubely Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all Tubely components.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use auth::Authenticator;
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
// Note: Storage, StorageError, StorageResult live in the tubely-storage crate
