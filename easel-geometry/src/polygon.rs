// MIT/Apache2 License

use crate::{point, DevicePoint, FillRule, FixedBox};
use alloc::vec::Vec;
use core::cmp::Ordering;
use tinyvec::TinyVec;

/// Distance under which a point is considered to lie on an edge.
const ON_EDGE_EPSILON: f64 = 1e-9;

/// One or more closed polygons, stored as a bag of non-horizontal edges.
///
/// Paths and strokes are simplified into this type before they are tested
/// for containment or rasterised. A polygon may carry limits: edges are
/// clipped to the union of the limit boxes as they are added, with the
/// parts outside a box folded onto its left or right side so that the
/// winding inside the box is unchanged.
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    /// The edges for this polygon.
    edges: Vec<Edge>,
    /// Boxes that edges are clipped to, if any.
    limits: TinyVec<[FixedBox; 1]>,
    /// Bounds of the edges as `(x1, y1, x2, y2)`.
    extents: Option<(f64, f64, f64, f64)>,
}

impl Polygon {
    /// Create an empty polygon with no limits.
    #[must_use]
    pub fn new() -> Polygon {
        Polygon::default()
    }

    /// Create an empty polygon whose edges are clipped to `limits`.
    #[must_use]
    pub fn with_limits(limits: &[FixedBox]) -> Polygon {
        Polygon {
            limits: limits.iter().copied().collect(),
            ..Polygon::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The bounding box of every edge, as `(x1, y1, x2, y2)`.
    #[inline]
    #[must_use]
    pub fn extents(&self) -> Option<(f64, f64, f64, f64)> {
        self.extents
    }

    /// Add the line from `p1` to `p2` to this polygon.
    pub fn add_line(&mut self, p1: DevicePoint, p2: DevicePoint) {
        // don't add perfectly horizontal edges
        if p1.y == p2.y || !(p1.y.is_finite() && p2.y.is_finite()) {
            return;
        }

        let edge = Edge::new(p1, p2);

        if self.limits.is_empty() {
            self.push(edge);
            return;
        }

        let limits = core::mem::take(&mut self.limits);
        for limit in limits.iter() {
            self.add_clipped_edge(&edge, limit);
        }
        self.limits = limits;
    }

    /// Add every edge of a closed polygon given by its vertices.
    pub fn add_closed<I: IntoIterator<Item = DevicePoint>>(&mut self, points: I) {
        let mut iter = points.into_iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return,
        };

        let last = iter.fold(first, |prev, pt| {
            self.add_line(prev, pt);
            pt
        });
        self.add_line(last, first);
    }

    fn push(&mut self, edge: Edge) {
        let (xa, xb) = (edge.x_at(edge.top), edge.x_at(edge.bottom));
        let bounds = (xa.min(xb), edge.top, xa.max(xb), edge.bottom);

        self.extents = Some(match self.extents {
            None => bounds,
            Some((x1, y1, x2, y2)) => (
                x1.min(bounds.0),
                y1.min(bounds.1),
                x2.max(bounds.2),
                y2.max(bounds.3),
            ),
        });

        self.edges.push(edge);
    }

    fn add_clipped_edge(&mut self, edge: &Edge, limit: &FixedBox) {
        let (lx1, ly1, lx2, ly2) = limit.to_f64();

        let top = edge.top.max(ly1);
        let bottom = edge.bottom.min(ly2);
        if top >= bottom {
            return;
        }

        // split the vertically clipped edge where it crosses the sides of
        // the limit box
        let mut cuts: TinyVec<[f64; 4]> = TinyVec::new();
        cuts.push(top);
        for side in [lx1, lx2] {
            if let Some(y) = edge.y_at(side) {
                if y > top && y < bottom {
                    cuts.push(y);
                }
            }
        }
        cuts.push(bottom);
        cuts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        for pair in cuts.windows(2) {
            let (y1, y2) = (pair[0], pair[1]);
            if y1 >= y2 {
                continue;
            }

            let mid = edge.x_at((y1 + y2) * 0.5);
            let piece = if mid < lx1 {
                Edge::vertical(lx1, y1, y2, edge.dir)
            } else if mid > lx2 {
                Edge::vertical(lx2, y1, y2, edge.dir)
            } else {
                Edge {
                    top: y1,
                    bottom: y2,
                    ..*edge
                }
            };

            self.push(piece);
        }
    }

    /// The winding number at `(x, y)`, counting the edges that cross the
    /// horizontal ray towards negative X.
    #[must_use]
    pub fn winding_at(&self, x: f64, y: f64) -> i32 {
        self.edges
            .iter()
            .filter(|edge| y >= edge.top && y < edge.bottom && edge.x_at(y) < x)
            .map(|edge| edge.dir)
            .sum()
    }

    /// Whether `(x, y)` is inside the polygon. Points exactly on an edge
    /// count as inside.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64, fill_rule: FillRule) -> bool {
        let on_edge = self.edges.iter().any(|edge| {
            y >= edge.top && y <= edge.bottom && (edge.x_at(y) - x).abs() <= ON_EDGE_EPSILON
        });

        on_edge || winding_is_inside(self.winding_at(x, y), fill_rule)
    }

    /// The spans of the scanline at `y` that lie inside the polygon, as
    /// `(x_start, x_end)` pairs sorted from left to right.
    #[must_use]
    pub fn spans_at(&self, y: f64, fill_rule: FillRule) -> Vec<(f64, f64)> {
        let mut crossings: Vec<(f64, i32)> = self
            .edges
            .iter()
            .filter(|edge| y >= edge.top && y < edge.bottom)
            .map(|edge| (edge.x_at(y), edge.dir))
            .collect();
        crossings.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut spans = Vec::new();
        let mut winding = 0;
        let mut start = 0.0;

        for (x, dir) in crossings {
            let was_inside = winding_is_inside(winding, fill_rule);
            winding += dir;
            let is_inside = winding_is_inside(winding, fill_rule);

            match (was_inside, is_inside) {
                (false, true) => start = x,
                (true, false) => {
                    if x > start {
                        spans.push((start, x));
                    }
                }
                _ => {}
            }
        }

        spans
    }
}

/// Whether a winding number counts as filled under `fill_rule`.
#[inline]
#[must_use]
pub fn winding_is_inside(winding: i32, fill_rule: FillRule) -> bool {
    match fill_rule {
        FillRule::NonZero => winding != 0,
        FillRule::EvenOdd => winding & 1 != 0,
    }
}

/// A non-horizontal edge of a polygon.
///
/// The edge runs along `line` but is only live between `top` and `bottom`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    /// The line the edge lies on, with `line.0.y < line.1.y`.
    pub line: (DevicePoint, DevicePoint),
    /// The upper limit of the edge.
    pub top: f64,
    /// The lower limit of the edge.
    pub bottom: f64,
    /// `1` if the original segment went downwards, `-1` if it went up.
    pub dir: i32,
}

impl Edge {
    /// Create an edge from the segment going from `p1` to `p2`.
    #[must_use]
    pub fn new(p1: DevicePoint, p2: DevicePoint) -> Edge {
        let (line, dir) = if p1.y < p2.y { ((p1, p2), 1) } else { ((p2, p1), -1) };
        Edge {
            line,
            top: line.0.y,
            bottom: line.1.y,
            dir,
        }
    }

    fn vertical(x: f64, top: f64, bottom: f64, dir: i32) -> Edge {
        Edge {
            line: (point(x, top), point(x, bottom)),
            top,
            bottom,
            dir,
        }
    }

    /// The X coordinate of the edge's line at `y`.
    #[must_use]
    pub fn x_at(&self, y: f64) -> f64 {
        let (p1, p2) = self.line;
        if p1.x == p2.x {
            return p1.x;
        }
        p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y)
    }

    /// The Y coordinate where the edge's line crosses `x`, if it does so at
    /// a single point.
    #[must_use]
    pub fn y_at(&self, x: f64) -> Option<f64> {
        let (p1, p2) = self.line;
        if p1.x == p2.x {
            return None;
        }
        Some(p1.y + (x - p1.x) * (p2.y - p1.y) / (p2.x - p1.x))
    }

    /// Get the intersection of two edges, if any.
    #[must_use]
    pub fn intersection(&self, other: &Edge) -> Option<DevicePoint> {
        let (a1, a2) = self.line;
        let (b1, b2) = other.line;
        let d1 = a2 - a1;
        let d2 = b2 - b1;
        let denom = d1.cross(d2);
        if denom == 0.0 {
            return None;
        }

        let t = (b1 - a1).cross(d2) / denom;
        let inter = a1 + d1 * t;
        if inter.y >= self.top
            && inter.y <= self.bottom
            && inter.y >= other.top
            && inter.y <= other.bottom
        {
            Some(inter)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(poly: &mut Polygon, x1: f64, y1: f64, x2: f64, y2: f64) {
        poly.add_closed([point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)]);
    }

    #[test]
    fn test_intersection() {
        // two edges that do intersect
        let e1 = Edge::new(point(0.0, 0.0), point(1.0, 1.0));
        let e2 = Edge::new(point(1.0, 0.0), point(0.0, 1.0));
        assert_eq!(e1.intersection(&e2), Some(point(0.5, 0.5)));

        // two parallel edges
        let e1 = Edge::new(point(0.0, 0.0), point(1.0, 1.0));
        let e2 = Edge::new(point(1.0, 0.0), point(2.0, 1.0));
        assert_eq!(e1.intersection(&e2), None);

        // two edges that are not parallel lines but do not intersect
        let e1 = Edge::new(point(0.0, 0.0), point(1.0, 1.0));
        let e2 = Edge::new(point(1.0, 0.0), point(2.0, 2.0));
        assert_eq!(e1.intersection(&e2), None);
    }

    #[test]
    fn horizontal_edges_are_dropped() {
        let mut poly = Polygon::new();
        square(&mut poly, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(poly.edges().len(), 2);
        assert_eq!(poly.extents(), Some((0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn fill_rules() {
        let mut poly = Polygon::new();
        square(&mut poly, 0.0, 0.0, 10.0, 10.0);
        square(&mut poly, 2.0, 2.0, 8.0, 8.0);

        assert!(poly.contains_point(5.0, 5.0, FillRule::NonZero));
        assert!(!poly.contains_point(5.0, 5.0, FillRule::EvenOdd));
        assert!(poly.contains_point(1.0, 5.0, FillRule::EvenOdd));
        assert!(!poly.contains_point(11.0, 5.0, FillRule::NonZero));

        let spans = poly.spans_at(5.0, FillRule::EvenOdd);
        assert_eq!(spans, [(0.0, 2.0), (8.0, 10.0)]);
    }

    #[test]
    fn limits_keep_winding_inside_box() {
        // a triangle much larger than the limit box, which lies inside it
        let limit = FixedBox::from_f64(10.0, 10.0, 20.0, 20.0);
        let mut poly = Polygon::with_limits(&[limit]);
        poly.add_closed([point(0.0, 0.0), point(100.0, 0.0), point(0.0, 100.0)]);

        assert!(poly.contains_point(15.0, 15.0, FillRule::NonZero));
        let (x1, y1, x2, y2) = poly.extents().unwrap();
        assert!(x1 >= 10.0 && y1 >= 10.0 && x2 <= 20.0 && y2 <= 20.0);
    }
}
