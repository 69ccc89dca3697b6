//! Domain models

pub mod video;

pub use video::{StorageReference, StorageReferenceError, VideoRecord, VideoResponse};
