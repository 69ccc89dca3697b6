//! Video processing module

pub mod aspect;
pub mod orchestration;
pub mod probe;
pub mod remux;
mod tool;

pub use aspect::AspectRatio;
pub use orchestration::{IngestConfig, IngestedVideo, VideoIngestor};
pub use probe::{FfprobeProber, MediaProber, ProbeError, ProbeResult};
pub use remux::{FastStartRemuxer, FfmpegRemuxer, RemuxError};
