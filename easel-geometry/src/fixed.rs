// MIT/Apache2 License

//! Fixed point numbers, used to store path coordinates once they have been
//! transformed into backend space.

use core::{fmt, ops};
#[cfg(not(feature = "std"))]
use num_traits::Float;
use num_traits::{Bounded, Zero};

use crate::Rectangle;

/// Number of fractional bits in a [`Fixed`].
pub const FIXED_FRAC_BITS: u32 = 8;

const FIXED_ONE: i32 = 1 << FIXED_FRAC_BITS;
const FIXED_FRAC_MASK: i32 = FIXED_ONE - 1;

/// A signed 24.8 fixed point number.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// The fixed point representation of one.
    pub const ONE: Fixed = Fixed(FIXED_ONE);
    /// The smallest representable positive value.
    pub const EPSILON: Fixed = Fixed(1);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);

    /// Wrap a raw fixed point value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Fixed {
        Fixed(raw)
    }

    /// Get the raw bits of this number.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_int(i: i32) -> Fixed {
        Fixed(i << FIXED_FRAC_BITS)
    }

    /// Convert a float to fixed point, rounding to the nearest representable
    /// value. Halves round away from zero.
    #[inline]
    #[must_use]
    pub fn from_f64(d: f64) -> Fixed {
        let scaled = (d * f64::from(FIXED_ONE)).round();
        if scaled >= f64::from(i32::MAX) {
            Fixed::MAX
        } else if scaled <= f64::from(i32::MIN) {
            Fixed::MIN
        } else {
            Fixed(scaled as i32)
        }
    }

    #[inline]
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(FIXED_ONE)
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.0 & FIXED_FRAC_MASK == 0
    }

    /// Round towards negative infinity, returning an integer.
    #[inline]
    #[must_use]
    pub const fn floor(self) -> i32 {
        self.0 >> FIXED_FRAC_BITS
    }

    /// Round towards positive infinity, returning an integer.
    #[inline]
    #[must_use]
    pub const fn ceil(self) -> i32 {
        ((self.0 as i64 + FIXED_FRAC_MASK as i64) >> FIXED_FRAC_BITS) as i32
    }

    /// Round to the nearest integer, halves rounding up.
    #[inline]
    #[must_use]
    pub const fn round(self) -> i32 {
        ((self.0 as i64 + (FIXED_ONE as i64 >> 1)) >> FIXED_FRAC_BITS) as i32
    }

    /// Round down to a whole fixed point value.
    #[inline]
    #[must_use]
    pub const fn floor_fixed(self) -> Fixed {
        Fixed(self.0 & !FIXED_FRAC_MASK)
    }

    /// Round up to a whole fixed point value.
    #[inline]
    #[must_use]
    pub fn ceil_fixed(self) -> Fixed {
        Fixed::from_int(self.ceil())
    }

    #[inline]
    #[must_use]
    pub const fn abs(self) -> Fixed {
        Fixed(self.0.wrapping_abs())
    }

    #[inline]
    #[must_use]
    pub fn saturating_add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }

    #[inline]
    #[must_use]
    pub fn saturating_sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }

    /// Multiply two fixed point numbers.
    #[inline]
    #[must_use]
    pub fn mul(self, other: Fixed) -> Fixed {
        let wide = (i64::from(self.0) * i64::from(other.0)) >> FIXED_FRAC_BITS;
        Fixed(wide as i32)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl ops::Add for Fixed {
    type Output = Fixed;

    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl ops::Sub for Fixed {
    type Output = Fixed;

    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl ops::Neg for Fixed {
    type Output = Fixed;

    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

impl ops::AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl ops::SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Zero for Fixed {
    #[inline]
    fn zero() -> Fixed {
        Fixed(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Bounded for Fixed {
    #[inline]
    fn min_value() -> Fixed {
        Fixed::MIN
    }

    #[inline]
    fn max_value() -> Fixed {
        Fixed::MAX
    }
}

/// A point in backend space, stored in fixed point.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    #[inline]
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> FixedPoint {
        FixedPoint { x, y }
    }

    #[inline]
    #[must_use]
    pub fn from_f64(x: f64, y: f64) -> FixedPoint {
        FixedPoint {
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_f64(self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }

    #[inline]
    #[must_use]
    pub fn translate(self, dx: Fixed, dy: Fixed) -> FixedPoint {
        FixedPoint {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned box in backend space. `p1` is the top left corner and `p2`
/// the bottom right one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedBox {
    pub p1: FixedPoint,
    pub p2: FixedPoint,
}

impl FixedBox {
    #[inline]
    #[must_use]
    pub const fn new(p1: FixedPoint, p2: FixedPoint) -> FixedBox {
        FixedBox { p1, p2 }
    }

    /// Create a box from two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: FixedPoint, b: FixedPoint) -> FixedBox {
        FixedBox {
            p1: FixedPoint::new(a.x.min(b.x), a.y.min(b.y)),
            p2: FixedPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A box that covers all of fixed point space.
    #[must_use]
    pub fn unbounded() -> FixedBox {
        FixedBox {
            p1: FixedPoint::new(Fixed::min_value(), Fixed::min_value()),
            p2: FixedPoint::new(Fixed::max_value(), Fixed::max_value()),
        }
    }

    #[must_use]
    pub fn from_rectangle(rect: &Rectangle) -> FixedBox {
        FixedBox {
            p1: FixedPoint::new(Fixed::from_int(rect.x), Fixed::from_int(rect.y)),
            p2: FixedPoint::new(
                Fixed::from_int(rect.x + rect.width),
                Fixed::from_int(rect.y + rect.height),
            ),
        }
    }

    /// Create a box from floating point coordinates.
    #[must_use]
    pub fn from_f64(x1: f64, y1: f64, x2: f64, y2: f64) -> FixedBox {
        FixedBox::from_corners(FixedPoint::from_f64(x1, y1), FixedPoint::from_f64(x2, y2))
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.p1.x >= self.p2.x || self.p1.y >= self.p2.y
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> Fixed {
        self.p2.x - self.p1.x
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> Fixed {
        self.p2.y - self.p1.y
    }

    /// Intersect this box with another one. Returns `false` if nothing is
    /// left, in which case `self` is left empty.
    pub fn intersect(&mut self, other: &FixedBox) -> bool {
        self.p1.x = self.p1.x.max(other.p1.x);
        self.p1.y = self.p1.y.max(other.p1.y);
        self.p2.x = self.p2.x.min(other.p2.x);
        self.p2.y = self.p2.y.min(other.p2.y);
        !self.is_empty()
    }

    /// Grow this box to include another one.
    pub fn union(&mut self, other: &FixedBox) {
        self.p1.x = self.p1.x.min(other.p1.x);
        self.p1.y = self.p1.y.min(other.p1.y);
        self.p2.x = self.p2.x.max(other.p2.x);
        self.p2.y = self.p2.y.max(other.p2.y);
    }

    /// Grow this box to include a point.
    pub fn add_point(&mut self, point: FixedPoint) {
        self.p1.x = self.p1.x.min(point.x);
        self.p1.y = self.p1.y.min(point.y);
        self.p2.x = self.p2.x.max(point.x);
        self.p2.y = self.p2.y.max(point.y);
    }

    /// Whether the point lies inside this box. The top and left edges are
    /// inclusive, the bottom and right ones are not.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: FixedPoint) -> bool {
        point.x >= self.p1.x && point.x < self.p2.x && point.y >= self.p1.y && point.y < self.p2.y
    }

    #[inline]
    #[must_use]
    pub fn contains_box(&self, other: &FixedBox) -> bool {
        self.p1.x <= other.p1.x
            && self.p1.y <= other.p1.y
            && self.p2.x >= other.p2.x
            && self.p2.y >= other.p2.y
    }

    /// Whether all four coordinates fall on pixel boundaries.
    #[inline]
    #[must_use]
    pub fn is_pixel_aligned(&self) -> bool {
        self.p1.x.is_integer()
            && self.p1.y.is_integer()
            && self.p2.x.is_integer()
            && self.p2.y.is_integer()
    }

    /// The smallest integer rectangle containing this box. The top left
    /// corner is floored and the bottom right one ceiled.
    #[must_use]
    pub fn round_to_rectangle(&self) -> Rectangle {
        let x = self.p1.x.floor();
        let y = self.p1.y.floor();
        Rectangle {
            x,
            y,
            width: self.p2.x.ceil().saturating_sub(x),
            height: self.p2.y.ceil().saturating_sub(y),
        }
    }

    /// The integer rectangle covering the pixels whose centres lie in this
    /// box; each coordinate is rounded.
    #[must_use]
    pub fn round_to_inner_rectangle(&self) -> Rectangle {
        let x = self.p1.x.round();
        let y = self.p1.y.round();
        Rectangle {
            x,
            y,
            width: self.p2.x.round().saturating_sub(x).max(0),
            height: self.p2.y.round().saturating_sub(y).max(0),
        }
    }

    #[must_use]
    pub fn translate(&self, dx: Fixed, dy: Fixed) -> FixedBox {
        FixedBox {
            p1: self.p1.translate(dx, dy),
            p2: self.p2.translate(dx, dy),
        }
    }

    /// Get the box as floating point `(x1, y1, x2, y2)`.
    #[must_use]
    pub fn to_f64(&self) -> (f64, f64, f64, f64) {
        (
            self.p1.x.to_f64(),
            self.p1.y.to_f64(),
            self.p2.x.to_f64(),
            self.p2.y.to_f64(),
        )
    }
}

/// The bounding box of a set of boxes, or `None` if the set is empty.
pub fn boxes_extents<'a, I: IntoIterator<Item = &'a FixedBox>>(boxes: I) -> Option<FixedBox> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(*b),
        Some(mut acc) => {
            acc.union(b);
            Some(acc)
        }
    })
}
