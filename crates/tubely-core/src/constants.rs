//! Application-wide constants.

/// The only container type accepted by the video ingestion pipeline.
pub const SUPPORTED_VIDEO_MEDIA_TYPE: &str = "video/mp4";

/// Image types accepted for thumbnails, with the extension used in storage keys.
pub const SUPPORTED_THUMBNAIL_MEDIA_TYPES: &[(&str, &str)] =
    &[("image/jpeg", "jpg"), ("image/png", "png")];

/// Multipart field carrying the video payload.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Multipart field carrying the thumbnail payload.
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Issuer expected on access tokens.
pub const JWT_ISSUER: &str = "tubely-access";

/// Storage key prefix for thumbnails.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnails";

/// Scheme used when persisting a storage reference.
pub const STORAGE_REFERENCE_SCHEME: &str = "object://";
