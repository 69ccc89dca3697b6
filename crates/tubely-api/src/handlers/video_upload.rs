//! `POST /videos/{video_id}/upload`

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::AppError;
use tubely_processing::UploadTooLarge;
use utoipa::ToSchema;

use super::VideoId;
use crate::auth::BearerToken;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoUploadResponse {
    /// Time-limited URL for the stored video
    pub url: String,
}

/// 413 when the route's body limit was hit, 400 for anything else wrong with the form.
pub(crate) fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return HttpAppError(AppError::PayloadTooLarge(err.body_text()));
    }
    HttpAppError(AppError::BadRequest(format!(
        "Unable to parse form: {}",
        err.body_text()
    )))
}

/// Body errors reach the pipeline as `io::Error`; the size limit keeps its identity.
fn field_read_error(err: MultipartError) -> io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::other(UploadTooLarge)
    } else {
        io::Error::other(err)
    }
}

#[utoipa::path(
    post,
    path = "/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored", body = VideoUploadResponse),
        (status = 400, description = "Invalid ID, media type or form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Unsupported media type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    VideoId(video_id): VideoId,
    BearerToken(token): BearerToken,
    mut multipart: Multipart,
) -> Result<Json<VideoUploadResponse>, HttpAppError> {
    tracing::debug!(video_id = %video_id, "Video upload started");

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let reader = StreamReader::new(field.map_err(field_read_error));

        let ingested = state
            .ingestor
            .ingest_video(video_id, &token, content_type.as_deref(), reader)
            .await?;

        return Ok(Json(VideoUploadResponse { url: ingested.url }));
    }

    Err(HttpAppError(AppError::BadRequest(format!(
        "Missing form field '{}'",
        VIDEO_FORM_FIELD
    ))))
}
