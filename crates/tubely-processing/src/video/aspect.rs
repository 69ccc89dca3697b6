use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance on `width / height` when matching a target ratio.
pub const RATIO_TOLERANCE: f64 = 0.01;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Aspect classification of a video, also used as its storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Landscape,
    Portrait,
    Other,
}

impl AspectRatio {
    pub fn classify(width: u32, height: u32) -> Self {
        Self::from_ratio(width as f64 / height as f64)
    }

    pub fn from_ratio(ratio: f64) -> Self {
        if (ratio - LANDSCAPE_RATIO).abs() < RATIO_TOLERANCE {
            AspectRatio::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
            AspectRatio::Portrait
        } else {
            AspectRatio::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Other => "other",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
