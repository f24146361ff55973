//! clipshape Media Model
//!
//! Value types shared by asset inspection, composition building, and
//! rendering:
//!
//! - **Geometry**: sizes, rectangles, aspect fitting, and 2D affine transforms
//! - **Time**: exact rational media time and time ranges
//! - **Orientation**: coarse classification of a track's display transform

pub mod geometry;
pub mod orientation;
pub mod time;

pub use geometry::{aspect_fit, AffineTransform, Point, Rect, Size};
pub use orientation::{resolve_orientation, OrientationInfo, VideoOrientation};
pub use time::{MediaTime, TimeRange};
