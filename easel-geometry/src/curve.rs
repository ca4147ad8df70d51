// MIT/Apache2 License

use crate::{FixedBox, FixedPoint, Slope};
#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Subdivision stops here even if the tolerance has not been met, which only
/// happens for degenerate input.
const SPLINE_RECURSION_LIMIT: u32 = 32;

/// A cubic bezier segment in backend space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Spline {
    /// The starting point.
    pub a: FixedPoint,
    /// The first control point.
    pub b: FixedPoint,
    /// The second control point.
    pub c: FixedPoint,
    /// The ending point.
    pub d: FixedPoint,
}

#[derive(Debug, Copy, Clone)]
struct Knots {
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    d: (f64, f64),
}

impl Spline {
    #[inline]
    #[must_use]
    pub const fn new(a: FixedPoint, b: FixedPoint, c: FixedPoint, d: FixedPoint) -> Spline {
        Spline { a, b, c, d }
    }

    /// A spline is degenerate when all four points coincide; it adds
    /// nothing to a path.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b && self.a == self.c && self.a == self.d
    }

    /// The direction the curve leaves its start point in.
    #[must_use]
    pub fn initial_slope(&self) -> Slope {
        let mut slope = Slope::from_points(self.a, self.b);
        if slope.is_zero() {
            slope = Slope::from_points(self.a, self.c);
        }
        if slope.is_zero() {
            slope = Slope::from_points(self.a, self.d);
        }
        slope
    }

    /// The direction the curve arrives at its end point from.
    #[must_use]
    pub fn final_slope(&self) -> Slope {
        let mut slope = Slope::from_points(self.c, self.d);
        if slope.is_zero() {
            slope = Slope::from_points(self.b, self.d);
        }
        if slope.is_zero() {
            slope = Slope::from_points(self.a, self.d);
        }
        slope
    }

    /// Flatten the curve into line segments no further than `tolerance` from
    /// it.
    ///
    /// `sink` receives the start point, every intermediate vertex and the end
    /// point, along with the tangent at that vertex. Degenerate splines emit
    /// nothing.
    pub fn decompose<F: FnMut(FixedPoint, Slope)>(&self, tolerance: f64, mut sink: F) {
        if self.is_degenerate() {
            return;
        }

        let initial = self.initial_slope();
        let last = self.final_slope();

        sink(self.a, initial);

        let knots = Knots {
            a: self.a.to_f64(),
            b: self.b.to_f64(),
            c: self.c.to_f64(),
            d: self.d.to_f64(),
        };
        let tolerance_squared = tolerance * tolerance;
        let mut prev = self.a;
        decompose_into(&knots, tolerance_squared, 0, &mut |pt: (f64, f64)| {
            let point = FixedPoint::from_f64(pt.0, pt.1);
            if point != prev {
                let tangent = Slope::from_points(prev, point);
                prev = point;
                sink(point, tangent);
            }
        });

        if prev != self.d {
            sink(self.d, last);
        }
    }

    /// Collect the flattened points of this curve, start point included.
    #[cfg(test)]
    fn flatten(&self, tolerance: f64) -> alloc::vec::Vec<(f64, f64)> {
        let mut points = alloc::vec::Vec::new();
        self.decompose(tolerance, |pt, _| points.push(pt.to_f64()));
        points
    }

    /// The exact bounds of the curve, found from the roots of its
    /// derivative.
    #[must_use]
    pub fn bounds(&self) -> FixedBox {
        let mut bounds = FixedBox::from_corners(self.a, self.d);
        let (ax, ay) = self.a.to_f64();
        let (bx, by) = self.b.to_f64();
        let (cx, cy) = self.c.to_f64();
        let (dx, dy) = self.d.to_f64();

        let mut extend = |t: f64| {
            if t > 0.0 && t < 1.0 {
                let (x, y) = eval((ax, ay), (bx, by), (cx, cy), (dx, dy), t);
                bounds.add_point(FixedPoint::from_f64(x, y));
            }
        };

        for (p0, p1, p2, p3) in [(ax, bx, cx, dx), (ay, by, cy, dy)] {
            // derivative of the cubic is a quadratic: a t^2 + b t + c
            let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
            let b = 2.0 * (p0 - 2.0 * p1 + p2);
            let c = p1 - p0;

            if a.abs() < f64::EPSILON {
                if b.abs() >= f64::EPSILON {
                    extend(-c / b);
                }
                continue;
            }

            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                continue;
            }
            let root = disc.sqrt();
            extend((-b + root) / (2.0 * a));
            extend((-b - root) / (2.0 * a));
        }

        bounds
    }
}

fn eval(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64), t: f64) -> (f64, f64) {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    (
        a.0 * mt2 * mt + 3.0 * b.0 * mt2 * t + 3.0 * c.0 * mt * t2 + d.0 * t2 * t,
        a.1 * mt2 * mt + 3.0 * b.1 * mt2 * t + 3.0 * c.1 * mt * t2 + d.1 * t2 * t,
    )
}

#[inline]
fn lerp_half(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * 0.5, a.1 + (b.1 - a.1) * 0.5)
}

/// Split `s1` in half, leaving the first half in `s1` and returning the
/// second.
fn de_casteljau(s1: &mut Knots) -> Knots {
    let ab = lerp_half(s1.a, s1.b);
    let bc = lerp_half(s1.b, s1.c);
    let cd = lerp_half(s1.c, s1.d);
    let abbc = lerp_half(ab, bc);
    let bccd = lerp_half(bc, cd);
    let fin = lerp_half(abbc, bccd);

    let s2 = Knots {
        a: fin,
        b: bccd,
        c: cd,
        d: s1.d,
    };

    s1.b = ab;
    s1.c = abbc;
    s1.d = fin;

    s2
}

/// Squared distance from `p` to the segment `a`-`b`.
fn point_segment_distance_squared(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (px, py) = (p.0 - a.0, p.1 - a.1);
    let len2 = dx * dx + dy * dy;

    if len2 == 0.0 {
        return px * px + py * py;
    }

    let t = (px * dx + py * dy) / len2;
    if t <= 0.0 {
        px * px + py * py
    } else if t >= 1.0 {
        let (qx, qy) = (p.0 - b.0, p.1 - b.1);
        qx * qx + qy * qy
    } else {
        let cross = px * dy - py * dx;
        cross * cross / len2
    }
}

/// Upper bound on how far the curve strays from its chord. The curve lies in
/// the convex hull of its control points, so the larger control point
/// distance bounds it.
fn error_squared(knots: &Knots) -> f64 {
    let berr = point_segment_distance_squared(knots.b, knots.a, knots.d);
    let cerr = point_segment_distance_squared(knots.c, knots.a, knots.d);
    berr.max(cerr)
}

fn decompose_into<F: FnMut((f64, f64))>(
    knots: &Knots,
    tolerance_squared: f64,
    depth: u32,
    emit: &mut F,
) {
    let err = error_squared(knots);
    if !(err >= tolerance_squared) || depth >= SPLINE_RECURSION_LIMIT {
        emit(knots.d);
        return;
    }

    let mut first = *knots;
    let second = de_casteljau(&mut first);

    decompose_into(&first, tolerance_squared, depth + 1, emit);
    decompose_into(&second, tolerance_squared, depth + 1, emit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spline(pts: [(f64, f64); 4]) -> Spline {
        Spline::new(
            FixedPoint::from_f64(pts[0].0, pts[0].1),
            FixedPoint::from_f64(pts[1].0, pts[1].1),
            FixedPoint::from_f64(pts[2].0, pts[2].1),
            FixedPoint::from_f64(pts[3].0, pts[3].1),
        )
    }

    fn distance_to_polyline(p: (f64, f64), polyline: &[(f64, f64)]) -> f64 {
        polyline
            .windows(2)
            .map(|w| point_segment_distance_squared(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    }

    #[test]
    fn flattening_respects_tolerance() {
        let curves = [
            [(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)],
            [(10.0, 10.0), (300.0, -50.0), (-200.0, 80.0), (40.0, 40.0)],
            [(0.0, 0.0), (50.0, 0.0), (50.0, 0.0), (100.0, 0.0)],
        ];

        for tolerance in [0.1, 0.5, 2.0] {
            for pts in curves.iter() {
                let s = spline(*pts);
                let flat = s.flatten(tolerance);
                assert!(flat.len() >= 2);

                for i in 0..=200 {
                    let t = f64::from(i) / 200.0;
                    let p = eval(pts[0], pts[1], pts[2], pts[3], t);
                    // allow for the rounding of each vertex into fixed point
                    assert!(distance_to_polyline(p, &flat) <= tolerance + 0.01);
                }
            }
        }
    }

    #[test]
    fn degenerate_spline_is_skipped() {
        let s = spline([(5.0, 5.0); 4]);
        let mut count = 0;
        s.decompose(0.1, |_, _| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn endpoints_are_emitted() {
        let s = spline([(0.0, 0.0), (10.0, 20.0), (30.0, 20.0), (40.0, 0.0)]);
        let flat = s.flatten(0.25);
        assert_eq!(flat.first(), Some(&(0.0, 0.0)));
        assert_eq!(flat.last(), Some(&(40.0, 0.0)));
    }

    #[test]
    fn bounds_are_tight() {
        let s = spline([(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]);
        let (x1, y1, x2, y2) = s.bounds().to_f64();
        assert_eq!((x1, y1, x2), (0.0, 0.0, 100.0));
        assert!((y2 - 75.0).abs() < 0.01);
    }
}
