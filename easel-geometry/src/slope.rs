// MIT/Apache2 License

use crate::{Fixed, FixedPoint};
use core::cmp;

/// The direction of a segment, stored as the difference between its
/// endpoints.
#[derive(Debug, Copy, Clone, Default)]
pub struct Slope {
    /// The change in X.
    pub dx: Fixed,
    /// The change in Y.
    pub dy: Fixed,
}

impl Slope {
    /// Create the slope pointing from `a` to `b`.
    #[inline]
    #[must_use]
    pub fn from_points(a: FixedPoint, b: FixedPoint) -> Slope {
        Slope {
            dx: b.x - a.x,
            dy: b.y - a.y,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx.to_raw() == 0 && self.dy.to_raw() == 0
    }

    /// Whether the two slopes point in exactly the same direction.
    #[must_use]
    pub fn same_direction(&self, other: &Slope) -> bool {
        self.cross(other) == 0 && self.dot(other) > 0
    }

    /// Whether the slopes point in opposite directions (more than 90 degrees
    /// apart).
    #[must_use]
    pub fn is_backwards(&self, other: &Slope) -> bool {
        self.dot(other) < 0
    }

    #[inline]
    fn cross(&self, other: &Slope) -> i64 {
        i64::from(self.dy.to_raw()) * i64::from(other.dx.to_raw())
            - i64::from(self.dx.to_raw()) * i64::from(other.dy.to_raw())
    }

    #[inline]
    fn dot(&self, other: &Slope) -> i64 {
        i64::from(self.dx.to_raw()) * i64::from(other.dx.to_raw())
            + i64::from(self.dy.to_raw()) * i64::from(other.dy.to_raw())
    }

    #[inline]
    #[must_use]
    pub fn to_f64(&self) -> (f64, f64) {
        (self.dx.to_f64(), self.dy.to_f64())
    }
}

impl PartialEq for Slope {
    fn eq(&self, other: &Slope) -> bool {
        self.cmp(other) == cmp::Ordering::Equal
    }
}

impl Eq for Slope {}

impl PartialOrd for Slope {
    fn partial_cmp(&self, other: &Slope) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slope {
    /// Order slopes by the angle they make with the positive X axis,
    /// walking clockwise in a Y-down space, in the range `(-pi, pi]`.
    fn cmp(&self, other: &Slope) -> cmp::Ordering {
        use cmp::Ordering::*;

        // first, compare the cross-product of the slopes
        let c1 = i64::from(self.dy.to_raw()) * i64::from(other.dx.to_raw());
        let c2 = i64::from(other.dy.to_raw()) * i64::from(self.dx.to_raw());
        if let x @ (Less | Greater) = c1.cmp(&c2) {
            return x;
        }

        // then, test for zero vectors, which sort after everything
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Equal,
            (true, false) => return Greater,
            (false, true) => return Less,
            (false, false) => {}
        }

        // these two slopes are either exactly the same or differ by
        // exactly pi
        //
        // to differentiate, look for a change in signage in either dx
        // or dy
        let sign_change_x = (self.dx.to_raw() ^ other.dx.to_raw()) < 0;
        let sign_change_y = (self.dy.to_raw() ^ other.dy.to_raw()) < 0;

        if sign_change_x || sign_change_y {
            if self.dx.to_raw() > 0 || (self.dx.to_raw() == 0 && self.dy.to_raw() > 0) {
                return Less;
            } else {
                return Greater;
            }
        }

        // all tests have failed, so the slopes have to be equal
        Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope(dx: i32, dy: i32) -> Slope {
        Slope {
            dx: Fixed::from_int(dx),
            dy: Fixed::from_int(dy),
        }
    }

    #[test]
    fn ordering() {
        assert!(slope(1, 0) < slope(1, 1));
        assert!(slope(1, 1) < slope(0, 1));
        assert_eq!(slope(2, 2), slope(1, 1));
        assert_ne!(slope(1, 1), slope(-1, -1));
        assert!(slope(1, 0) < slope(0, 0));
    }

    #[test]
    fn directions() {
        assert!(slope(1, 2).same_direction(&slope(2, 4)));
        assert!(!slope(1, 2).same_direction(&slope(-1, -2)));
        assert!(slope(1, 0).is_backwards(&slope(-1, 1)));
    }
}
