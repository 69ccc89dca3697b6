//! Tubely media processing
//!
//! The video ingestion pipeline and the external tools it drives: ffprobe for stream
//! geometry, ffmpeg for fast-start remuxing. Both tools sit behind capability traits
//! (`MediaProber`, `FastStartRemuxer`) so the pipeline never assumes how they run.

pub mod error;
pub mod thumbnail;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{IngestError, UploadTooLarge};
pub use video::{
    AspectRatio, FastStartRemuxer, FfmpegRemuxer, FfprobeProber, IngestConfig, IngestedVideo,
    MediaProber, ProbeError, ProbeResult, RemuxError, VideoIngestor,
};
