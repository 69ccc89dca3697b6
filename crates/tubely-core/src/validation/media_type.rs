//! Media-type header parsing.
//!
//! Only the essence (`type/subtype`) matters for validation; parameters such as
//! `; codecs=...` are accepted and dropped.

use mime::Mime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("Missing media type")]
    Missing,

    #[error("Invalid media type: {0}")]
    Malformed(String),
}

/// Parse a `Content-Type` style header value and return its lowercased essence.
pub fn parse_media_type(raw: Option<&str>) -> Result<String, MediaTypeError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(MediaTypeError::Missing);
    }

    let parsed: Mime = raw
        .parse()
        .map_err(|_| MediaTypeError::Malformed(raw.to_string()))?;
    if parsed.subtype().as_str().is_empty() {
        return Err(MediaTypeError::Malformed(raw.to_string()));
    }

    Ok(parsed.essence_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_media_type() {
        assert_eq!(parse_media_type(Some("video/mp4")).unwrap(), "video/mp4");
    }

    #[test]
    fn test_parameters_and_case_are_normalised() {
        assert_eq!(
            parse_media_type(Some("Video/MP4; codecs=\"avc1.42E01E\"")).unwrap(),
            "video/mp4"
        );
    }

    #[test]
    fn test_quoted_parameter_may_contain_semicolon() {
        assert_eq!(
            parse_media_type(Some("video/mp4; codecs=\"avc1.42E01E;mp4a.40.2\"")).unwrap(),
            "video/mp4"
        );
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(parse_media_type(None), Err(MediaTypeError::Missing));
        assert_eq!(parse_media_type(Some("   ")), Err(MediaTypeError::Missing));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_media_type(Some("mp4")),
            Err(MediaTypeError::Malformed(_))
        ));
        assert!(matches!(
            parse_media_type(Some("video/")),
            Err(MediaTypeError::Malformed(_))
        ));
        assert!(matches!(
            parse_media_type(Some("video/mp4; =oops")),
            Err(MediaTypeError::Malformed(_))
        ));
        assert!(matches!(
            parse_media_type(Some("video/mp4; codecs=\"avc1")),
            Err(MediaTypeError::Malformed(_))
        ));
    }
}
