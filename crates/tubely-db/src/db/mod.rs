//! Database repositories for data access layer
//!
//! `VideoRepository` is the seam the ingestion pipeline depends on. `video` holds the
//! PostgreSQL implementation, `memory` the in-process one.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};
