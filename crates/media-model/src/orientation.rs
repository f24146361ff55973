//! Coarse orientation of a video track.
//!
//! Classification compares the linear part of a display transform exactly
//! against the four quarter-turn patterns. Anything else, including a
//! rotation combined with a scale, resolves to [`VideoOrientation::Up`] in
//! landscape.

use serde::{Deserialize, Serialize};

use crate::geometry::AffineTransform;

/// Which way the top of the stored frame points when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoOrientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

/// Result of [`resolve_orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrientationInfo {
    pub orientation: VideoOrientation,
    pub is_portrait: bool,
}

impl OrientationInfo {
    /// Whether width and height swap between storage and display.
    pub fn swaps_axes(&self) -> bool {
        self.is_portrait && self.orientation != VideoOrientation::Up
    }
}

/// Classify a display transform.
pub fn resolve_orientation(transform: &AffineTransform) -> OrientationInfo {
    let AffineTransform { a, b, c, d, .. } = *transform;

    let (orientation, is_portrait) = if a == 0.0 && b == 1.0 && c == -1.0 && d == 0.0 {
        (VideoOrientation::Right, true)
    } else if a == 0.0 && b == -1.0 && c == 1.0 && d == 0.0 {
        (VideoOrientation::Left, true)
    } else if a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0 {
        (VideoOrientation::Up, false)
    } else if a == -1.0 && b == 0.0 && c == 0.0 && d == -1.0 {
        (VideoOrientation::Down, false)
    } else {
        (VideoOrientation::Up, false)
    };

    OrientationInfo {
        orientation,
        is_portrait,
    }
}
