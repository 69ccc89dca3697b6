//! `POST /videos/{video_id}/thumbnail`

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tubely_core::constants::THUMBNAIL_FORM_FIELD;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;

use super::video_upload::multipart_error;
use super::VideoId;
use crate::auth::BearerToken;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/videos/{video_id}/thumbnail",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored", body = VideoResponse),
        (status = 400, description = "Invalid ID, media type or form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Thumbnail exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Unsupported media type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    VideoId(video_id): VideoId,
    BearerToken(token): BearerToken,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(THUMBNAIL_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(multipart_error)?;

        let video = state
            .ingestor
            .ingest_thumbnail(video_id, &token, content_type.as_deref(), data)
            .await?;

        return Ok(Json(video));
    }

    Err(HttpAppError(AppError::BadRequest(format!(
        "Missing form field '{}'",
        THUMBNAIL_FORM_FIELD
    ))))
}
