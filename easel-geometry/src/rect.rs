// MIT/Apache2 License

use core::cmp;

/// Largest coordinate an unbounded rectangle reaches. Chosen so that
/// `x + width` can never overflow and still fits in a 24.8 fixed point value.
const RECT_INT_MIN: i32 = i32::MIN >> 9;
const RECT_INT_MAX: i32 = i32::MAX >> 9;

/// A rectangle on the integer pixel grid.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Rectangle {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle covering everything that can be drawn to.
    #[inline]
    #[must_use]
    pub const fn unbounded() -> Rectangle {
        Rectangle {
            x: RECT_INT_MIN,
            y: RECT_INT_MIN,
            width: RECT_INT_MAX - RECT_INT_MIN,
            height: RECT_INT_MAX - RECT_INT_MIN,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        *self == Rectangle::unbounded()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    #[must_use]
    pub fn x2(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    #[must_use]
    pub fn y2(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Intersect with another rectangle in place. Returns `false` and leaves
    /// an empty rectangle if they do not overlap.
    pub fn intersect(&mut self, other: &Rectangle) -> bool {
        let x1 = cmp::max(self.x, other.x);
        let y1 = cmp::max(self.y, other.y);
        let x2 = cmp::min(self.x2(), other.x2());
        let y2 = cmp::min(self.y2(), other.y2());

        if x1 >= x2 || y1 >= y2 {
            *self = Rectangle::new(x1, y1, 0, 0);
            false
        } else {
            *self = Rectangle::new(x1, y1, x2 - x1, y2 - y1);
            true
        }
    }

    /// Grow this rectangle so that it covers `other` as well.
    pub fn union(&mut self, other: &Rectangle) {
        let x1 = cmp::min(self.x, other.x);
        let y1 = cmp::min(self.y, other.y);
        let x2 = cmp::max(self.x2(), other.x2());
        let y2 = cmp::max(self.y2(), other.y2());
        *self = Rectangle::new(x1, y1, x2 - x1, y2 - y1);
    }

    #[inline]
    #[must_use]
    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.x2() >= other.x2()
            && self.y2() >= other.y2()
    }

    #[inline]
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x2() && y >= self.y && y < self.y2()
    }

    #[inline]
    #[must_use]
    pub fn translate(&self, dx: i32, dy: i32) -> Rectangle {
        Rectangle::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A rectangle with floating point coordinates, used for user space
/// results.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RectangleF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectangleF {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> RectangleF {
        RectangleF {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Rectangle> for RectangleF {
    fn from(r: Rectangle) -> RectangleF {
        RectangleF::new(
            f64::from(r.x),
            f64::from(r.y),
            f64::from(r.width),
            f64::from(r.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection() {
        let mut r = Rectangle::new(10, 10, 50, 50);
        assert!(r.intersect(&Rectangle::new(30, 0, 100, 20)));
        assert_eq!(r, Rectangle::new(30, 10, 30, 10));

        let mut r = Rectangle::new(10, 10, 50, 50);
        assert!(!r.intersect(&Rectangle::new(200, 200, 10, 10)));
        assert!(r.is_empty());
    }

    #[test]
    fn unbounded_contains_everything() {
        let u = Rectangle::unbounded();
        assert!(u.contains_rectangle(&Rectangle::new(-1000, -1000, 1_000_000, 1_000_000)));
        let mut r = u;
        r.intersect(&Rectangle::new(1, 2, 3, 4));
        assert_eq!(r, Rectangle::new(1, 2, 3, 4));
    }
}
