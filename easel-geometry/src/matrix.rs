// MIT/Apache2 License

use crate::{Fixed, RectangleF};
#[cfg(not(feature = "std"))]
use num_traits::Float;

/// A 2x3 affine transformation.
///
/// A point `(x, y)` is mapped to:
///
/// ```text
/// x' = xx * x + xy * y + x0
/// y' = yx * x + yy * y + y0
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Matrix {
    #[inline]
    fn default() -> Matrix {
        Matrix::identity()
    }
}

impl Matrix {
    #[inline]
    #[must_use]
    pub const fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Matrix {
        Matrix {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn identity() -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    #[must_use]
    pub const fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    #[must_use]
    pub const fn scaling(sx: f64, sy: f64) -> Matrix {
        Matrix::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// A rotation by `radians`. Positive angles rotate from the positive X
    /// axis towards the positive Y axis.
    #[must_use]
    pub fn rotation(radians: f64) -> Matrix {
        let (s, c) = radians.sin_cos();
        Matrix::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Compose two transforms: the result applies `self` first, then
    /// `other`.
    #[must_use]
    pub fn then(&self, other: &Matrix) -> Matrix {
        let a = self;
        let b = other;
        Matrix {
            xx: a.xx * b.xx + a.yx * b.xy,
            yx: a.xx * b.yx + a.yx * b.yy,
            xy: a.xy * b.xx + a.yy * b.xy,
            yy: a.xy * b.yx + a.yy * b.yy,
            x0: a.x0 * b.xx + a.y0 * b.xy + b.x0,
            y0: a.x0 * b.yx + a.y0 * b.yy + b.y0,
        }
    }

    /// Prepend a translation, so that it is applied before this transform.
    #[must_use]
    pub fn pre_translate(&self, tx: f64, ty: f64) -> Matrix {
        Matrix::translation(tx, ty).then(self)
    }

    #[must_use]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Matrix {
        Matrix::scaling(sx, sy).then(self)
    }

    #[must_use]
    pub fn pre_rotate(&self, radians: f64) -> Matrix {
        Matrix::rotation(radians).then(self)
    }

    #[inline]
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.yx * self.xy
    }

    #[inline]
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        self.is_finite() && det != 0.0
    }

    /// Compute the inverse of this transform, or `None` if it is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Matrix> {
        // translations and scales are common enough to skip the general case
        if self.xy == 0.0 && self.yx == 0.0 {
            if self.xx == 0.0 || self.yy == 0.0 {
                return None;
            }
            let xx = 1.0 / self.xx;
            let yy = 1.0 / self.yy;
            let inv = Matrix::new(xx, 0.0, 0.0, yy, -self.x0 * xx, -self.y0 * yy);
            return if inv.is_finite() { Some(inv) } else { None };
        }

        let det = self.determinant();
        if !det.is_finite() || det == 0.0 {
            return None;
        }

        let inv_det = 1.0 / det;
        let inv = Matrix {
            xx: self.yy * inv_det,
            yx: -self.yx * inv_det,
            xy: -self.xy * inv_det,
            yy: self.xx * inv_det,
            x0: (self.xy * self.y0 - self.yy * self.x0) * inv_det,
            y0: (self.yx * self.x0 - self.xx * self.y0) * inv_det,
        };

        if inv.is_finite() {
            Some(inv)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.xx.is_finite()
            && self.yx.is_finite()
            && self.xy.is_finite()
            && self.yy.is_finite()
            && self.x0.is_finite()
            && self.y0.is_finite()
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = self.transform_distance(x, y);
        (dx + self.x0, dy + self.y0)
    }

    /// Transform a vector; the translation component is ignored.
    #[inline]
    #[must_use]
    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (
            self.xx * dx + self.xy * dy,
            self.yx * dx + self.yy * dy,
        )
    }

    /// Transform an axis-aligned rectangle and return the bounding box of the
    /// result as `(x1, y1, x2, y2)`.
    #[must_use]
    pub fn transform_bounding_box(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64, f64, f64) {
        if self.is_translation() {
            return (x1 + self.x0, y1 + self.y0, x2 + self.x0, y2 + self.y0);
        }

        let corners = [
            self.transform_point(x1, y1),
            self.transform_point(x2, y1),
            self.transform_point(x1, y2),
            self.transform_point(x2, y2),
        ];

        corners.iter().skip(1).fold(
            (corners[0].0, corners[0].1, corners[0].0, corners[0].1),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }

    /// Transform a floating point rectangle, returning its bounds.
    #[must_use]
    pub fn transform_rectangle(&self, rect: &RectangleF) -> RectangleF {
        let (x1, y1, x2, y2) =
            self.transform_bounding_box(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height);
        RectangleF::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Matrix::identity()
    }

    #[inline]
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.xx == 1.0 && self.yx == 0.0 && self.xy == 0.0 && self.yy == 1.0
    }

    /// Whether this is a translation by whole backend units. Returns the
    /// offsets if so.
    #[must_use]
    pub fn integer_translation(&self) -> Option<(i32, i32)> {
        if !self.is_translation() {
            return None;
        }

        let tx = Fixed::from_f64(self.x0);
        let ty = Fixed::from_f64(self.y0);
        if tx.is_integer() && ty.is_integer() {
            Some((tx.floor(), ty.floor()))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn is_integer_translation(&self) -> bool {
        self.integer_translation().is_some()
    }

    /// Whether this transform maps pixels one-to-one: a scale of exactly
    /// one along each axis, possibly rotated by a multiple of 90 degrees or
    /// flipped.
    #[must_use]
    pub fn has_unity_scale(&self) -> bool {
        let det = self.determinant();
        if det * det != 1.0 {
            return false;
        }

        if self.xy == 0.0 && self.yx == 0.0 {
            (self.xx == 1.0 || self.xx == -1.0) && (self.yy == 1.0 || self.yy == -1.0)
        } else if self.xx == 0.0 && self.yy == 0.0 {
            (self.xy == 1.0 || self.xy == -1.0) && (self.yx == 1.0 || self.yx == -1.0)
        } else {
            false
        }
    }

    /// Whether sampling through this transform hits pixel centres exactly:
    /// unity scale and a whole-pixel offset.
    #[must_use]
    pub fn is_pixel_exact(&self) -> bool {
        if !self.has_unity_scale() {
            return false;
        }

        Fixed::from_f64(self.x0).is_integer() && Fixed::from_f64(self.y0).is_integer()
    }

    /// Get the lengths the unit vectors are scaled to, as `(sx, sy)`.
    #[must_use]
    pub fn scale_factors(&self) -> (f64, f64) {
        let sx = self.xx.hypot(self.yx);
        let sy = self.xy.hypot(self.yy);
        (sx, sy)
    }

    /// The length of the major axis of the ellipse a circle of `radius`
    /// becomes when transformed.
    #[must_use]
    pub fn transformed_circle_major_axis(&self, radius: f64) -> f64 {
        if self.has_unity_scale() {
            return radius;
        }

        let (a, b, c, d) = (self.xx, self.yx, self.xy, self.yy);

        let i = a * a + b * b;
        let j = c * c + d * d;

        let f = 0.5 * (i + j);
        let g = 0.5 * (i - j);
        let h = a * c + b * d;

        radius * (f + g.hypot(h)).sqrt()
    }
}

/// A transform kept together with its inverse.
///
/// Every mutation goes through a method that recomputes both halves, or fails
/// without changing anything if the result would not be invertible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InvertibleMatrix {
    forward: Matrix,
    inverse: Matrix,
}

impl Default for InvertibleMatrix {
    fn default() -> InvertibleMatrix {
        InvertibleMatrix::identity()
    }
}

impl InvertibleMatrix {
    #[must_use]
    pub const fn identity() -> InvertibleMatrix {
        InvertibleMatrix {
            forward: Matrix::identity(),
            inverse: Matrix::identity(),
        }
    }

    /// Pair a matrix with its inverse, or `None` if it is singular.
    #[must_use]
    pub fn new(forward: Matrix) -> Option<InvertibleMatrix> {
        let inverse = forward.invert()?;
        Some(InvertibleMatrix { forward, inverse })
    }

    #[inline]
    #[must_use]
    pub fn forward(&self) -> &Matrix {
        &self.forward
    }

    #[inline]
    #[must_use]
    pub fn inverse(&self) -> &Matrix {
        &self.inverse
    }

    /// Replace the transform with `forward` applied after `pre`. Fails
    /// without modification if the result is singular.
    pub fn prepend(&mut self, pre: &Matrix) -> Option<()> {
        *self = InvertibleMatrix::new(pre.then(&self.forward))?;
        Some(())
    }

    pub fn set(&mut self, forward: Matrix) -> Option<()> {
        *self = InvertibleMatrix::new(forward)?;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn composition_order() {
        let m = Matrix::scaling(2.0, 2.0).then(&Matrix::translation(10.0, 0.0));
        assert_eq!(m.transform_point(1.0, 1.0), (12.0, 2.0));

        let m = Matrix::translation(10.0, 0.0).then(&Matrix::scaling(2.0, 2.0));
        assert_eq!(m.transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn inversion() {
        let m = Matrix::rotation(0.3)
            .then(&Matrix::scaling(2.0, 3.0))
            .then(&Matrix::translation(5.0, -7.0));
        let inv = m.invert().unwrap();
        let (x, y) = m.transform_point(3.0, 4.0);
        let (x, y) = inv.transform_point(x, y);
        assert_relative_eq!(x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(y, 4.0, epsilon = 1e-9);

        assert!(Matrix::scaling(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn pixel_exactness() {
        assert!(Matrix::translation(3.0, -4.0).is_pixel_exact());
        assert!(!Matrix::translation(3.5, 0.0).is_pixel_exact());
        assert!(!Matrix::scaling(2.0, 2.0).is_pixel_exact());
        let quarter = Matrix::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
        assert!(quarter.has_unity_scale());
        assert!(!Matrix::rotation(FRAC_PI_2 / 3.0).has_unity_scale());
    }

    #[test]
    fn invertible_pair_rejects_singular() {
        let mut pair = InvertibleMatrix::identity();
        assert!(pair.prepend(&Matrix::translation(1.0, 2.0)).is_some());
        let before = pair;
        assert!(pair.prepend(&Matrix::scaling(0.0, 0.0)).is_none());
        assert_eq!(pair, before);
    }

    #[test]
    fn non_finite_is_not_invertible() {
        assert!(Matrix::translation(3.0, -1.0).is_invertible());
        assert!(!Matrix::translation(f64::NAN, 0.0).is_invertible());
        assert!(!Matrix::scaling(f64::INFINITY, 1.0).is_invertible());
    }

    #[test]
    fn circle_major_axis() {
        let m = Matrix::scaling(3.0, 1.0);
        assert_relative_eq!(m.transformed_circle_major_axis(1.0), 3.0, epsilon = 1e-12);
    }
}
