//! Tubely database layer
//!
//! Video metadata repositories: PostgreSQL for deployments, an in-memory map for
//! development and tests.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};

/// Embedded schema migrations, applied at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
