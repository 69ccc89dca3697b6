//! Ingestion failure taxonomy.
//!
//! Every variant is terminal for the current request; nothing in the pipeline retries.

use thiserror::Error;
use tubely_core::AppError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("upload too large: {0}")]
    TooLarge(String),

    #[error("could not stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error("external tool failure: {0}")]
    ExternalToolFailure(String),

    #[error("object store failure: {0}")]
    StoreFailure(String),

    #[error("metadata store failure: {0}")]
    MetadataFailure(String),

    #[error("entropy source unavailable: {0}")]
    EntropyError(String),
}

/// Carried inside the `io::Error` of an upload stream that hit its size limit.
#[derive(Debug, Error)]
#[error("upload exceeds the configured size limit")]
pub struct UploadTooLarge;

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Unauthenticated(msg) => AppError::Unauthorized(msg),
            IngestError::Forbidden(msg) => AppError::Forbidden(msg),
            IngestError::NotFound(msg) => AppError::NotFound(msg),
            IngestError::UnsupportedMedia(msg) => AppError::UnsupportedMediaType(msg),
            IngestError::BadInput(msg) => AppError::BadRequest(msg),
            IngestError::TooLarge(msg) => AppError::PayloadTooLarge(msg),
            IngestError::Staging(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
            IngestError::ExternalToolFailure(msg) => AppError::MediaProcessing(msg),
            IngestError::StoreFailure(msg) => AppError::Storage(msg),
            IngestError::MetadataFailure(msg) => AppError::Metadata(msg),
            IngestError::EntropyError(msg) => AppError::Internal(msg),
        }
    }
}

/// `NotFound` passes through; any other metadata-store error is a `MetadataFailure`.
pub(crate) fn from_metadata_error(err: AppError) -> IngestError {
    match err {
        AppError::NotFound(msg) => IngestError::NotFound(msg),
        other => IngestError::MetadataFailure(other.to_string()),
    }
}
