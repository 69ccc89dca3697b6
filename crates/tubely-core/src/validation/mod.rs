//! Request validation helpers shared by the pipeline and the HTTP layer.

pub mod media_type;

pub use media_type::{parse_media_type, MediaTypeError};
