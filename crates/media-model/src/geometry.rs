//! Pixel-space geometry: sizes, rectangles, and 2D affine transforms.
//!
//! Coordinates are in pixels with `(0, 0)` at the top-left and `y` growing
//! downwards. Transforms use the row-vector convention of display matrices:
//!
//! ```text
//! x' = a·x + c·y + tx
//! y' = b·x + d·y + ty
//! ```

use serde::{Deserialize, Serialize};

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Same size with the axes swapped.
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// True when either dimension is zero, negative, or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }
}

/// Largest rectangle with the aspect ratio of `aspect` that fits inside
/// `bounding`, centered in it.
pub fn aspect_fit(aspect: Size, bounding: Rect) -> Rect {
    if aspect.is_empty() {
        let center = bounding.center();
        return Rect {
            origin: center,
            size: Size::ZERO,
        };
    }

    let scale = (bounding.size.width / aspect.width).min(bounding.size.height / aspect.height);
    let size = Size::new(aspect.width * scale, aspect.height * scale);
    let center = bounding.center();
    Rect {
        origin: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
        size,
    }
}

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// The display transform for a frame of `natural` size that must be
    /// rotated `clockwise_degrees` for presentation.
    ///
    /// The result maps the natural frame onto a rectangle whose top-left
    /// corner is the origin. Quarter turns produce exact coefficients.
    pub fn display_rotation(clockwise_degrees: f64, natural: Size) -> Self {
        let degrees = clockwise_degrees.rem_euclid(360.0);
        let (w, h) = (natural.width, natural.height);

        if degrees == 0.0 {
            return Self::IDENTITY;
        }
        if degrees == 90.0 {
            return Self::new(0.0, 1.0, -1.0, 0.0, h, 0.0);
        }
        if degrees == 180.0 {
            return Self::new(-1.0, 0.0, 0.0, -1.0, w, h);
        }
        if degrees == 270.0 {
            return Self::new(0.0, -1.0, 1.0, 0.0, 0.0, w);
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let rotation = Self::new(cos, sin, -sin, cos, 0.0, 0.0);
        let bounds = rotation.apply_to_rect(Rect::from_size(natural));
        rotation.concatenating(&Self::translation(-bounds.min_x(), -bounds.min_y()))
    }

    /// `self` followed by `other`.
    pub fn concatenating(&self, other: &AffineTransform) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.tx * other.a + self.ty * other.c + other.tx,
            ty: self.tx * other.b + self.ty * other.d + other.ty,
        }
    }

    /// `self` followed by a scale.
    pub fn then_scale(&self, sx: f64, sy: f64) -> Self {
        self.concatenating(&Self::scale(sx, sy))
    }

    /// `self` followed by a translation.
    pub fn then_translate(&self, tx: f64, ty: f64) -> Self {
        self.concatenating(&Self::translation(tx, ty))
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Bounding box of the transformed rectangle.
    pub fn apply_to_rect(&self, rect: Rect) -> Rect {
        let corners = [
            Point::new(rect.min_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.min_y()),
            Point::new(rect.min_x(), rect.max_y()),
            Point::new(rect.max_x(), rect.max_y()),
        ]
        .map(|p| self.apply(p));

        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_aspect_fit_letterboxes_wide_source() {
        let fit = aspect_fit(Size::new(1920.0, 1080.0), Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert!(approx(fit.size.width, 1000.0));
        assert!(approx(fit.size.height, 562.5));
        assert!(approx(fit.origin.x, 0.0));
        assert!(approx(fit.origin.y, 218.75));
    }

    #[test]
    fn test_aspect_fit_empty_aspect_collapses_to_center() {
        let fit = aspect_fit(Size::ZERO, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(fit.origin, Point::new(50.0, 25.0));
        assert_eq!(fit.size, Size::ZERO);
    }

    #[test]
    fn test_concatenation_order() {
        // Scale first, then translate: translation is not scaled.
        let t = AffineTransform::scale(2.0, 3.0).then_translate(10.0, 20.0);
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 23.0));

        // Translate first, then scale: translation is scaled.
        let t = AffineTransform::translation(10.0, 20.0).then_scale(2.0, 3.0);
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(22.0, 63.0));
    }

    #[test]
    fn test_quarter_turn_maps_frame_to_origin() {
        let natural = Size::new(1920.0, 1080.0);
        for deg in [90.0, 180.0, 270.0, -90.0] {
            let t = AffineTransform::display_rotation(deg, natural);
            let bounds = t.apply_to_rect(Rect::from_size(natural));
            assert!(approx(bounds.min_x(), 0.0), "deg {deg}");
            assert!(approx(bounds.min_y(), 0.0), "deg {deg}");
        }

        let cw = AffineTransform::display_rotation(90.0, natural);
        assert_eq!((cw.a, cw.b, cw.c, cw.d), (0.0, 1.0, -1.0, 0.0));
        let bounds = cw.apply_to_rect(Rect::from_size(natural));
        assert_eq!(bounds.size, natural.transposed());
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        assert!(AffineTransform::display_rotation(360.0, Size::new(10.0, 10.0)).is_identity());
    }

    proptest! {
        #[test]
        fn prop_aspect_fit_stays_inside_bounds(
            aw in 1.0f64..8000.0,
            ah in 1.0f64..8000.0,
            bw in 1.0f64..8000.0,
            bh in 1.0f64..8000.0,
        ) {
            let bounds = Rect::new(0.0, 0.0, bw, bh);
            let fit = aspect_fit(Size::new(aw, ah), bounds);
            prop_assert!(fit.min_x() >= -1e-6);
            prop_assert!(fit.min_y() >= -1e-6);
            prop_assert!(fit.max_x() <= bw + 1e-6);
            prop_assert!(fit.max_y() <= bh + 1e-6);
            // One axis always touches the bounds.
            prop_assert!(
                (fit.size.width - bw).abs() < 1e-6 || (fit.size.height - bh).abs() < 1e-6
            );
        }

        #[test]
        fn prop_arbitrary_rotation_bounds_start_at_origin(
            deg in -720.0f64..720.0,
            w in 1.0f64..4000.0,
            h in 1.0f64..4000.0,
        ) {
            let natural = Size::new(w, h);
            let t = AffineTransform::display_rotation(deg, natural);
            let bounds = t.apply_to_rect(Rect::from_size(natural));
            prop_assert!(bounds.min_x().abs() < 1e-6);
            prop_assert!(bounds.min_y().abs() < 1e-6);
        }
    }
}
