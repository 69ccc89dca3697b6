//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video hosting API: owners upload MP4 videos and thumbnails, which are remuxed for fast start, classified by aspect ratio and stored in an object store behind time-limited URLs."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_get::get_video,
        handlers::assets::get_asset,
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::video_upload::VideoUploadResponse,
        handlers::health::HealthResponse,
        models::VideoResponse,
    )),
    tags(
        (name = "videos", description = "Video upload and retrieval"),
        (name = "assets", description = "Signed object access for non-S3 backends"),
        (name = "health", description = "Operational probes")
    )
)]
pub struct ApiDoc;
