// MIT/Apache2 License

#![allow(clippy::module_name_repetitions)]

use crate::{
    point, DevicePoint, FillRule, Fixed, FixedBox, FixedPoint, Matrix, Polygon, Rectangle, Slope,
    Spline,
};
use alloc::vec::Vec;
use core::{iter::FusedIterator, slice};

/// A path event expressed in floating point backend coordinates.
pub type PathEvent = lyon_path::Event<DevicePoint, DevicePoint>;

/// A path in backend space, stored as fixed point.
///
/// The path keeps a handful of derived flags up to date as it is built, so
/// that the drawing code can pick a fast route without walking the segments.
/// Subpaths are started lazily: a `move_to` only records the point, and the
/// segment is added once something is drawn from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFixed {
    segments: Vec<PathSegment>,
    current_point: FixedPoint,
    last_move_point: FixedPoint,
    extents: FixedBox,
    has_current_point: bool,
    needs_move_to: bool,
    has_extents: bool,
    has_curve_to: bool,
    stroke_is_rectilinear: bool,
    fill_is_rectilinear: bool,
    fill_maybe_region: bool,
    fill_is_empty: bool,
}

/// A single operation in a [`PathFixed`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Begin a new subpath at this point.
    MoveTo(FixedPoint),
    /// A straight line to this point.
    LineTo(FixedPoint),
    /// A cubic bezier curve with two control points and an endpoint.
    CurveTo(FixedPoint, FixedPoint, FixedPoint),
    /// Close the current subpath with a straight line to its start.
    ClosePath,
}

impl PathSegment {
    /// The point this segment ends at, if it has one.
    #[inline]
    #[must_use]
    pub fn end_point(&self) -> Option<FixedPoint> {
        match self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) | PathSegment::CurveTo(_, _, p) => {
                Some(*p)
            }
            PathSegment::ClosePath => None,
        }
    }
}

/// Receives the segments of a path as it is walked.
pub trait PathSink {
    fn move_to(&mut self, point: FixedPoint);
    fn line_to(&mut self, point: FixedPoint);
    fn curve_to(&mut self, b: FixedPoint, c: FixedPoint, d: FixedPoint);
    fn close_path(&mut self);
}

impl Default for PathFixed {
    fn default() -> PathFixed {
        PathFixed::new()
    }
}

impl PathFixed {
    /// Create a new, empty path.
    #[must_use]
    pub fn new() -> PathFixed {
        PathFixed {
            segments: Vec::new(),
            current_point: FixedPoint::default(),
            last_move_point: FixedPoint::default(),
            extents: FixedBox::default(),
            has_current_point: false,
            needs_move_to: true,
            has_extents: false,
            has_curve_to: false,
            stroke_is_rectilinear: true,
            fill_is_rectilinear: true,
            fill_maybe_region: true,
            fill_is_empty: true,
        }
    }

    /// Create a closed, axis-aligned path around `bx`.
    #[must_use]
    pub fn from_box(bx: &FixedBox) -> PathFixed {
        let mut path = PathFixed::new();
        path.move_to(bx.p1);
        path.line_to(FixedPoint::new(bx.p2.x, bx.p1.y));
        path.line_to(bx.p2);
        path.line_to(FixedPoint::new(bx.p1.x, bx.p2.y));
        path.close_path();
        path
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn has_current_point(&self) -> bool {
        self.has_current_point
    }

    /// The current point, if there is one.
    #[inline]
    #[must_use]
    pub fn current_point(&self) -> Option<FixedPoint> {
        if self.has_current_point {
            Some(self.current_point)
        } else {
            None
        }
    }

    /// The point the current subpath started at.
    #[inline]
    #[must_use]
    pub fn last_move_point(&self) -> FixedPoint {
        self.last_move_point
    }

    #[inline]
    #[must_use]
    pub fn has_curve_to(&self) -> bool {
        self.has_curve_to
    }

    /// Whether every segment of the path is horizontal or vertical.
    #[inline]
    #[must_use]
    pub fn stroke_is_rectilinear(&self) -> bool {
        self.stroke_is_rectilinear
    }

    /// Whether the filled path is made only of horizontal and vertical edges,
    /// including the edge that implicitly closes the last subpath.
    #[must_use]
    pub fn fill_is_rectilinear(&self) -> bool {
        if !self.fill_is_rectilinear {
            return false;
        }
        if !self.has_current_point || self.needs_move_to {
            return true;
        }
        self.implicit_close_is_rectilinear()
    }

    /// Whether the filled path is rectilinear with every vertex on the pixel
    /// grid, and thus could be represented as a set of pixel rectangles.
    #[must_use]
    pub fn fill_maybe_region(&self) -> bool {
        if !self.fill_maybe_region {
            return false;
        }
        if !self.has_current_point || self.needs_move_to {
            return true;
        }
        self.implicit_close_is_rectilinear()
    }

    /// Whether filling this path could not produce any coverage.
    #[inline]
    #[must_use]
    pub fn fill_is_empty(&self) -> bool {
        self.fill_is_empty
    }

    #[inline]
    fn implicit_close_is_rectilinear(&self) -> bool {
        self.current_point.x == self.last_move_point.x
            || self.current_point.y == self.last_move_point.y
    }

    /// The bounds of every point on the path, curves included.
    #[inline]
    #[must_use]
    pub fn extents(&self) -> Option<FixedBox> {
        if self.has_extents {
            Some(self.extents)
        } else {
            None
        }
    }

    #[inline]
    fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    #[inline]
    fn last_is_line_to(&self) -> bool {
        matches!(self.last_segment(), Some(PathSegment::LineTo(_)))
    }

    /// The end point of the segment before the last one.
    fn penultimate_point(&self) -> Option<FixedPoint> {
        let len = self.segments.len();
        if len < 2 {
            return None;
        }
        self.segments[len - 2].end_point()
    }

    fn drop_line_to(&mut self) {
        debug_assert!(self.last_is_line_to());
        self.segments.pop();
    }

    fn begin_sub_path(&mut self) {
        if !self.needs_move_to {
            // the previous subpath held at least one segment, close it for
            // the purposes of filling
            if self.fill_is_rectilinear {
                self.fill_is_rectilinear = self.implicit_close_is_rectilinear();
                self.fill_maybe_region &= self.fill_is_rectilinear;
            }
            self.needs_move_to = true;
        }
        self.has_current_point = false;
    }

    fn move_to_apply(&mut self) {
        if !self.needs_move_to {
            return;
        }
        self.needs_move_to = false;

        if self.has_extents {
            self.extents.add_point(self.current_point);
        } else {
            self.extents = FixedBox::new(self.current_point, self.current_point);
            self.has_extents = true;
        }

        if self.fill_maybe_region {
            self.fill_maybe_region =
                self.current_point.x.is_integer() && self.current_point.y.is_integer();
        }

        self.last_move_point = self.current_point;
        self.segments.push(PathSegment::MoveTo(self.current_point));
    }

    /// Begin a new subpath at `point`.
    pub fn move_to(&mut self, point: FixedPoint) {
        self.begin_sub_path();
        self.has_current_point = true;
        self.current_point = point;
        self.last_move_point = point;
    }

    /// Drop the current point, so that the next segment starts a new
    /// subpath.
    pub fn new_sub_path(&mut self) {
        self.begin_sub_path();
    }

    /// Add a straight line from the current point to `point`. Without a
    /// current point this acts as `move_to`.
    pub fn line_to(&mut self, point: FixedPoint) {
        if !self.has_current_point {
            self.move_to(point);
            return;
        }

        self.move_to_apply();

        // a degenerate line right after the move is a dot, which still
        // strokes; anywhere else it adds nothing
        if !matches!(self.last_segment(), Some(PathSegment::MoveTo(_)))
            && point == self.current_point
        {
            return;
        }

        // a line continuing the previous one in the same direction replaces
        // its end point
        if self.last_is_line_to() {
            if let Some(prev) = self.penultimate_point() {
                if prev == self.current_point {
                    self.drop_line_to();
                } else {
                    let prev_slope = Slope::from_points(prev, self.current_point);
                    let this_slope = Slope::from_points(self.current_point, point);
                    if prev_slope == this_slope && !prev_slope.is_backwards(&this_slope) {
                        self.drop_line_to();
                    }
                }
            }
        }

        if self.stroke_is_rectilinear {
            self.stroke_is_rectilinear =
                self.current_point.x == point.x || self.current_point.y == point.y;
            self.fill_is_rectilinear &= self.stroke_is_rectilinear;
            self.fill_maybe_region &= self.fill_is_rectilinear;
            if self.fill_maybe_region {
                self.fill_maybe_region = point.x.is_integer() && point.y.is_integer();
            }
            if self.fill_is_empty {
                self.fill_is_empty = self.current_point == point;
            }
        }

        self.current_point = point;
        self.extents.add_point(point);
        self.segments.push(PathSegment::LineTo(point));
    }

    /// Add a cubic bezier curve from the current point. A curve that does
    /// not move at all is added as a line instead.
    pub fn curve_to(&mut self, b: FixedPoint, c: FixedPoint, d: FixedPoint) {
        if self.has_current_point
            && self.current_point == d
            && b == d
            && c == d
        {
            self.line_to(d);
            return;
        }

        if !self.has_current_point {
            self.move_to(b);
        }

        self.move_to_apply();

        // a degenerate line right before the curve is superseded by it
        if self.last_is_line_to() && self.penultimate_point() == Some(self.current_point) {
            self.drop_line_to();
        }

        let spline = Spline::new(self.current_point, b, c, d);
        self.extents.union(&spline.bounds());

        self.current_point = d;
        self.has_curve_to = true;
        self.stroke_is_rectilinear = false;
        self.fill_is_rectilinear = false;
        self.fill_maybe_region = false;
        self.fill_is_empty = false;

        self.segments.push(PathSegment::CurveTo(b, c, d));
    }

    /// Close the current subpath with a line back to its start.
    pub fn close_path(&mut self) {
        if !self.has_current_point {
            return;
        }

        // run the closing line through line_to so the flags see it, then
        // drop it again since the close implies it
        self.line_to(self.last_move_point);
        if self.last_is_line_to() {
            self.drop_line_to();
        }

        self.needs_move_to = true;
        self.segments.push(PathSegment::ClosePath);
    }

    /// Shift every point of the path.
    pub fn translate(&mut self, dx: Fixed, dy: Fixed) {
        if dx.to_raw() == 0 && dy.to_raw() == 0 {
            return;
        }

        for segment in &mut self.segments {
            match segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => *p = p.translate(dx, dy),
                PathSegment::CurveTo(b, c, d) => {
                    *b = b.translate(dx, dy);
                    *c = c.translate(dx, dy);
                    *d = d.translate(dx, dy);
                }
                PathSegment::ClosePath => {}
            }
        }

        self.current_point = self.current_point.translate(dx, dy);
        self.last_move_point = self.last_move_point.translate(dx, dy);
        self.extents = self.extents.translate(dx, dy);
        self.fill_maybe_region &= dx.is_integer() && dy.is_integer();
    }

    /// Apply `matrix` to every point of the path.
    pub fn transform(&mut self, matrix: &Matrix) {
        if let Some((dx, dy)) = matrix.integer_translation() {
            self.translate(Fixed::from_int(dx), Fixed::from_int(dy));
            return;
        }

        let map = |p: FixedPoint| {
            let (x, y) = p.to_f64();
            let (x, y) = matrix.transform_point(x, y);
            FixedPoint::from_f64(x, y)
        };

        // rebuild so that the flags are recomputed for the new geometry
        let mut rebuilt = PathFixed::new();
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) => rebuilt.move_to(map(p)),
                PathSegment::LineTo(p) => rebuilt.line_to(map(p)),
                PathSegment::CurveTo(b, c, d) => rebuilt.curve_to(map(b), map(c), map(d)),
                PathSegment::ClosePath => rebuilt.close_path(),
            }
        }

        // keep a trailing move_to that has not been applied yet
        if self.has_current_point && self.needs_move_to {
            rebuilt.move_to(map(self.current_point));
        }

        *self = rebuilt;
    }

    /// Walk the segments of the path in order.
    pub fn interpret<S: PathSink + ?Sized>(&self, sink: &mut S) {
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) => sink.move_to(p),
                PathSegment::LineTo(p) => sink.line_to(p),
                PathSegment::CurveTo(b, c, d) => sink.curve_to(b, c, d),
                PathSegment::ClosePath => sink.close_path(),
            }
        }
    }

    /// Walk the path with every curve replaced by line segments within
    /// `tolerance` of it. The sink never sees `curve_to`.
    pub fn interpret_flat<S: PathSink + ?Sized>(&self, tolerance: f64, sink: &mut S) {
        let mut flattener = Flattener {
            sink,
            tolerance,
            current: FixedPoint::default(),
        };
        self.interpret(&mut flattener);
    }

    /// Iterate over the path as `lyon_path` events in floating point.
    #[must_use]
    pub fn events(&self) -> Events<'_> {
        Events {
            segments: self.segments.iter(),
            first: point(0.0, 0.0),
            current: point(0.0, 0.0),
            in_subpath: false,
            pending: None,
        }
    }

    /// The integer rectangle covering every point of the path.
    #[must_use]
    pub fn approximate_clip_extents(&self) -> Rectangle {
        match self.extents() {
            Some(extents) => extents.round_to_rectangle(),
            None => Rectangle::default(),
        }
    }

    /// The integer rectangle covering the area filling this path could
    /// touch, found from the point extents alone.
    #[must_use]
    pub fn approximate_fill_extents(&self) -> Rectangle {
        match self.extents() {
            Some(extents) if extents.p1.x < extents.p2.x && extents.p1.y < extents.p2.y => {
                extents.round_to_rectangle()
            }
            _ => Rectangle::default(),
        }
    }

    /// Flatten the path into `polygon`, closing every subpath.
    pub fn fill_to_polygon(&self, tolerance: f64, polygon: &mut Polygon) {
        let mut filler = PolygonFiller {
            polygon,
            first: None,
            current: FixedPoint::default(),
        };
        self.interpret_flat(tolerance, &mut filler);
        filler.close_path();
    }

    /// The exact bounds of the area covered by filling this path, as
    /// `(x1, y1, x2, y2)`.
    #[must_use]
    pub fn fill_extents(&self, fill_rule: FillRule, tolerance: f64) -> Option<(f64, f64, f64, f64)> {
        if self.fill_is_empty {
            return None;
        }

        if self.fill_is_rectilinear() {
            let boxes = self.fill_rectilinear_to_boxes(fill_rule)?;
            return crate::boxes_extents(boxes.iter()).map(|b| b.to_f64());
        }

        let mut polygon = Polygon::new();
        self.fill_to_polygon(tolerance, &mut polygon);
        polygon.extents()
    }

    /// Whether the point `(x, y)` would be covered by filling this path.
    /// Points on the boundary count as covered.
    #[must_use]
    pub fn in_fill(&self, x: f64, y: f64, fill_rule: FillRule, tolerance: f64) -> bool {
        if self.fill_is_empty {
            return false;
        }

        let mut polygon = Polygon::new();
        self.fill_to_polygon(tolerance, &mut polygon);
        polygon.contains_point(x, y, fill_rule)
    }

    /// If this path is a single axis-aligned rectangle, return it.
    ///
    /// This only looks at the first few segments, so it is cheap to call on
    /// any path.
    #[must_use]
    pub fn is_box(&self) -> Option<FixedBox> {
        if !self.fill_is_rectilinear() {
            return None;
        }

        let points = self.quad_points()?;
        if points_form_rect(&points) {
            Some(FixedBox::from_corners(points[0], points[2]))
        } else {
            None
        }
    }

    /// If this path is a closed rectangle suitable for stroking as one,
    /// return it.
    #[must_use]
    pub fn is_rectangle(&self) -> Option<FixedBox> {
        // stroking needs an explicit close, otherwise the corner at the
        // start is capped instead of joined
        match self.segments.as_slice() {
            [PathSegment::MoveTo(_), PathSegment::LineTo(_), PathSegment::LineTo(_), PathSegment::LineTo(_), PathSegment::ClosePath] => {
                self.is_box()
            }
            _ => None,
        }
    }

    /// The four corners of the path if it is shaped like a quadrilateral.
    fn quad_points(&self) -> Option<[FixedPoint; 4]> {
        let segs = &self.segments;
        if segs.len() < 4 || segs.len() > 6 {
            return None;
        }

        let corners = match (segs[0], segs[1], segs[2], segs[3]) {
            (
                PathSegment::MoveTo(a),
                PathSegment::LineTo(b),
                PathSegment::LineTo(c),
                PathSegment::LineTo(d),
            ) => [a, b, c, d],
            _ => return None,
        };

        if segs.len() > 4 {
            // the rectangle may end with a line back to the start or with a
            // close, but nothing else
            match segs[4] {
                PathSegment::LineTo(e) if e == corners[0] => {}
                PathSegment::ClosePath => {}
                _ => return None,
            }

            if segs.len() == 6
                && !matches!(segs[5], PathSegment::MoveTo(_) | PathSegment::ClosePath)
            {
                return None;
            }
        }

        Some(corners)
    }

    /// Break a rectilinear path into disjoint boxes covering its fill, or
    /// `None` if the path is not rectilinear.
    #[must_use]
    pub fn fill_rectilinear_to_boxes(&self, fill_rule: FillRule) -> Option<Vec<FixedBox>> {
        if !self.fill_is_rectilinear() {
            return None;
        }

        if let Some(bx) = self.is_box() {
            return Some(if bx.is_empty() { Vec::new() } else { alloc::vec![bx] });
        }

        let mut edges = Vec::new();
        let mut collector = VerticalEdges {
            edges: &mut edges,
            first: None,
            current: FixedPoint::default(),
        };
        self.interpret(&mut collector);
        collector.close_path();

        Some(sweep_vertical_edges(&mut edges, fill_rule))
    }
}

/// Merge possibly overlapping boxes into a disjoint set covering the same
/// area.
#[must_use]
pub fn boxes_union(boxes: &[FixedBox]) -> Vec<FixedBox> {
    let mut edges: Vec<VerticalEdge> = boxes
        .iter()
        .filter(|b| !b.is_empty())
        .flat_map(|b| {
            [
                VerticalEdge {
                    x: b.p1.x,
                    top: b.p1.y,
                    bottom: b.p2.y,
                    dir: 1,
                },
                VerticalEdge {
                    x: b.p2.x,
                    top: b.p1.y,
                    bottom: b.p2.y,
                    dir: -1,
                },
            ]
        })
        .collect();

    sweep_vertical_edges(&mut edges, FillRule::NonZero)
}

fn points_form_rect(points: &[FixedPoint; 4]) -> bool {
    (points[0].y == points[1].y
        && points[1].x == points[2].x
        && points[2].y == points[3].y
        && points[3].x == points[0].x)
        || (points[0].x == points[1].x
            && points[1].y == points[2].y
            && points[2].x == points[3].x
            && points[3].y == points[0].y)
}

/// Adapts a sink to receive only straight lines.
struct Flattener<'a, S: ?Sized> {
    sink: &'a mut S,
    tolerance: f64,
    current: FixedPoint,
}

impl<'a, S: PathSink + ?Sized> PathSink for Flattener<'a, S> {
    fn move_to(&mut self, point: FixedPoint) {
        self.current = point;
        self.sink.move_to(point);
    }

    fn line_to(&mut self, point: FixedPoint) {
        self.current = point;
        self.sink.line_to(point);
    }

    fn curve_to(&mut self, b: FixedPoint, c: FixedPoint, d: FixedPoint) {
        let spline = Spline::new(self.current, b, c, d);
        let start = self.current;
        let sink = &mut *self.sink;
        spline.decompose(self.tolerance, |pt, _| {
            if pt != start {
                sink.line_to(pt);
            }
        });
        self.current = d;
    }

    fn close_path(&mut self) {
        self.sink.close_path();
    }
}

/// Adds the edges of a flattened path to a polygon.
struct PolygonFiller<'a> {
    polygon: &'a mut Polygon,
    first: Option<FixedPoint>,
    current: FixedPoint,
}

impl<'a> PolygonFiller<'a> {
    fn add_edge(&mut self, from: FixedPoint, to: FixedPoint) {
        let (x1, y1) = from.to_f64();
        let (x2, y2) = to.to_f64();
        self.polygon.add_line(point(x1, y1), point(x2, y2));
    }
}

impl<'a> PathSink for PolygonFiller<'a> {
    fn move_to(&mut self, point: FixedPoint) {
        self.close_path();
        self.first = Some(point);
        self.current = point;
    }

    fn line_to(&mut self, point: FixedPoint) {
        self.add_edge(self.current, point);
        self.current = point;
    }

    fn curve_to(&mut self, _b: FixedPoint, _c: FixedPoint, d: FixedPoint) {
        self.line_to(d);
    }

    fn close_path(&mut self) {
        if let Some(first) = self.first.take() {
            self.add_edge(self.current, first);
            self.current = first;
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct VerticalEdge {
    x: Fixed,
    top: Fixed,
    bottom: Fixed,
    dir: i32,
}

/// Collects the vertical edges of a rectilinear path, closing each subpath.
struct VerticalEdges<'a> {
    edges: &'a mut Vec<VerticalEdge>,
    first: Option<FixedPoint>,
    current: FixedPoint,
}

impl<'a> VerticalEdges<'a> {
    fn add_edge(&mut self, from: FixedPoint, to: FixedPoint) {
        if from.x != to.x || from.y == to.y {
            return;
        }

        let (top, bottom, dir) = if from.y < to.y {
            (from.y, to.y, 1)
        } else {
            (to.y, from.y, -1)
        };
        self.edges.push(VerticalEdge {
            x: from.x,
            top,
            bottom,
            dir,
        });
    }
}

impl<'a> PathSink for VerticalEdges<'a> {
    fn move_to(&mut self, point: FixedPoint) {
        self.close_path();
        self.first = Some(point);
        self.current = point;
    }

    fn line_to(&mut self, point: FixedPoint) {
        self.add_edge(self.current, point);
        self.current = point;
    }

    fn curve_to(&mut self, _b: FixedPoint, _c: FixedPoint, d: FixedPoint) {
        self.line_to(d);
    }

    fn close_path(&mut self) {
        if let Some(first) = self.first.take() {
            self.add_edge(self.current, first);
            self.current = first;
        }
    }
}

/// Sweep a set of vertical edges from top to bottom, producing the boxes
/// covered under `fill_rule`. Bands with identical spans are merged.
fn sweep_vertical_edges(edges: &mut [VerticalEdge], fill_rule: FillRule) -> Vec<FixedBox> {
    let mut ys: Vec<Fixed> = edges.iter().flat_map(|e| [e.top, e.bottom]).collect();
    ys.sort_unstable();
    ys.dedup();

    edges.sort_by_key(|e| e.x);

    let mut boxes: Vec<FixedBox> = Vec::new();
    // indices into `boxes` of the spans of the previous band
    let mut open: Vec<usize> = Vec::new();
    let mut spans: Vec<(Fixed, Fixed)> = Vec::new();

    for band in ys.windows(2) {
        let (y1, y2) = (band[0], band[1]);

        spans.clear();
        let mut winding = 0;
        let mut start = Fixed::from_raw(0);
        for edge in edges.iter().filter(|e| e.top <= y1 && e.bottom >= y2) {
            let was_inside = crate::winding_is_inside(winding, fill_rule);
            winding += edge.dir;
            let is_inside = crate::winding_is_inside(winding, fill_rule);

            match (was_inside, is_inside) {
                (false, true) => start = edge.x,
                (true, false) if edge.x > start => match spans.last_mut() {
                    // touching spans join up
                    Some(last) if last.1 == start => last.1 = edge.x,
                    _ => spans.push((start, edge.x)),
                },
                _ => {}
            }
        }

        let continues = open.len() == spans.len()
            && open.iter().zip(spans.iter()).all(|(&i, span)| {
                let bx = &boxes[i];
                bx.p2.y == y1 && bx.p1.x == span.0 && bx.p2.x == span.1
            });

        if continues {
            for &i in &open {
                boxes[i].p2.y = y2;
            }
        } else {
            open.clear();
            for &(x1, x2) in &spans {
                open.push(boxes.len());
                boxes.push(FixedBox::new(FixedPoint::new(x1, y1), FixedPoint::new(x2, y2)));
            }
        }
    }

    boxes
}

/// Iterator over the events of a [`PathFixed`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    segments: slice::Iter<'a, PathSegment>,
    first: DevicePoint,
    current: DevicePoint,
    in_subpath: bool,
    pending: Option<PathEvent>,
}

#[inline]
fn to_device(p: FixedPoint) -> DevicePoint {
    let (x, y) = p.to_f64();
    point(x, y)
}

impl<'a> Iterator for Events<'a> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        use lyon_path::Event;

        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        loop {
            let segment = match self.segments.next() {
                Some(segment) => segment,
                None => {
                    if self.in_subpath {
                        self.in_subpath = false;
                        return Some(Event::End {
                            last: self.current,
                            first: self.first,
                            close: false,
                        });
                    }
                    return None;
                }
            };

            match *segment {
                PathSegment::MoveTo(p) => {
                    let at = to_device(p);
                    let begin = Event::Begin { at };
                    let end = if self.in_subpath {
                        Some(Event::End {
                            last: self.current,
                            first: self.first,
                            close: false,
                        })
                    } else {
                        None
                    };

                    self.first = at;
                    self.current = at;
                    self.in_subpath = true;

                    return match end {
                        Some(end) => {
                            self.pending = Some(begin);
                            Some(end)
                        }
                        None => Some(begin),
                    };
                }
                PathSegment::LineTo(p) => {
                    let to = to_device(p);
                    let from = core::mem::replace(&mut self.current, to);
                    return Some(Event::Line { from, to });
                }
                PathSegment::CurveTo(b, c, d) => {
                    let to = to_device(d);
                    let from = core::mem::replace(&mut self.current, to);
                    return Some(Event::Cubic {
                        from,
                        ctrl1: to_device(b),
                        ctrl2: to_device(c),
                        to,
                    });
                }
                PathSegment::ClosePath => {
                    if self.in_subpath {
                        self.in_subpath = false;
                        let last = core::mem::replace(&mut self.current, self.first);
                        return Some(Event::End {
                            last,
                            first: self.first,
                            close: true,
                        });
                    }
                }
            }
        }
    }
}

impl<'a> FusedIterator for Events<'a> {}
