// MIT/Apache2 License

//! Turning stroked paths into fillable geometry.
//!
//! The stroke is built as a union of simple closed shapes in user space: one
//! quadrilateral per segment, a wedge for every join and a shape for every
//! cap. Each shape is wound the same way, so filling the result with the
//! non-zero rule gives their union.

use crate::{
    FillRule, FixedBox, FixedPoint, LineCap, LineJoin, Matrix, PathFixed, PathSink, Polygon,
    Rectangle,
};
use alloc::vec::Vec;
use core::{
    f64::consts::{FRAC_PI_2, PI, SQRT_2},
    fmt,
};
use lyon_geom::{point, vector, Point, Vector};
#[cfg(not(feature = "std"))]
use num_traits::Float;
use tinyvec::TinyVec;

/// Round caps on an approximated dash cover this fraction of the square
/// that bounds them.
const ROUND_MINSQ_APPROXIMATION: f64 = 9.0 * PI / 32.0;

/// Lengths below this are treated as zero when walking dashes.
const DASH_EPSILON: f64 = 1e-12;

/// The dash array was rejected because it had a negative entry or no
/// positive one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InvalidDash;

impl fmt::Display for InvalidDash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dash array entries must be non-negative and not all zero")
    }
}

/// The parameters used to stroke a path, in user space units.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    dash: TinyVec<[f64; 4]>,
    dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> StrokeStyle {
        StrokeStyle {
            line_width: StrokeStyle::DEFAULT_LINE_WIDTH,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: StrokeStyle::DEFAULT_MITER_LIMIT,
            dash: TinyVec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
    pub const DEFAULT_MITER_LIMIT: f64 = 10.0;

    /// Set the dash pattern. An empty array turns dashing off.
    ///
    /// An odd number of entries is repeated once so that the "on" and "off"
    /// roles alternate between repetitions. The offset is normalised into a
    /// single period.
    pub fn set_dash(&mut self, dashes: &[f64], offset: f64) -> Result<(), InvalidDash> {
        if dashes.is_empty() {
            self.dash.clear();
            self.dash_offset = 0.0;
            return Ok(());
        }

        if dashes.iter().any(|d| *d < 0.0 || !d.is_finite()) {
            return Err(InvalidDash);
        }
        let total: f64 = dashes.iter().sum();
        if total <= 0.0 {
            return Err(InvalidDash);
        }

        let mut dash: TinyVec<[f64; 4]> = dashes.iter().copied().collect();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(dashes);
        }

        let period: f64 = dash.iter().sum();
        let mut offset = offset % period;
        if offset < 0.0 {
            offset += period;
        }
        if offset <= 0.0 {
            offset = 0.0;
        }

        self.dash = dash;
        self.dash_offset = offset;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn dash(&self) -> &[f64] {
        &self.dash
    }

    #[inline]
    #[must_use]
    pub fn dash_offset(&self) -> f64 {
        self.dash_offset
    }

    #[inline]
    #[must_use]
    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }

    /// The length of one repetition of the dash pattern.
    #[must_use]
    pub fn dash_period(&self) -> f64 {
        self.dash.iter().sum()
    }

    /// The length of the pattern that is inked, counting what the caps add
    /// to each dash.
    #[must_use]
    pub fn dash_stroked(&self) -> f64 {
        let cap_scale = match self.line_cap {
            LineCap::Butt => 0.0,
            LineCap::Square => 1.0,
            LineCap::Round => PI / 4.0,
        };

        self.dash
            .chunks(2)
            .map(|pair| {
                let off = pair.get(1).copied().unwrap_or(0.0);
                pair[0] + cap_scale * off.min(self.line_width)
            })
            .sum()
    }

    /// Whether the dash period is so short once transformed that it cannot
    /// be told apart from a continuous line of the same coverage.
    #[must_use]
    pub fn dash_can_approximate(&self, ctm: &Matrix, tolerance: f64) -> bool {
        self.is_dashed() && ctm.transformed_circle_major_axis(self.dash_period()) < tolerance
    }

    /// Replace the dash pattern with a single dash and gap whose period
    /// transforms to `tolerance` and whose inked fraction matches the
    /// original's. Returns the new dashes and offset.
    #[must_use]
    pub fn dash_approximate(&self, ctm: &Matrix, tolerance: f64) -> ([f64; 2], f64) {
        let coverage = (self.dash_stroked() / self.dash_period()).min(1.0);
        let scale = tolerance / ctm.transformed_circle_major_axis(1.0);

        // find whether the pattern starts on or off
        let mut offset = self.dash_offset;
        let mut on = true;
        let mut i = 0;
        while offset > 0.0 && offset >= self.dash[i] {
            offset -= self.dash[i];
            on = !on;
            i = (i + 1) % self.dash.len();
        }

        let on_length = match self.line_cap {
            LineCap::Butt => scale * coverage,
            LineCap::Round => (scale * (coverage - ROUND_MINSQ_APPROXIMATION)
                / (1.0 - ROUND_MINSQ_APPROXIMATION))
                .max(scale * coverage - ROUND_MINSQ_APPROXIMATION * self.line_width),
            LineCap::Square => (scale * coverage - self.line_width).max(0.0),
        };

        let dashes = [on_length, scale - on_length];
        let offset = if on { 0.0 } else { on_length };
        (dashes, offset)
    }

    /// How far from the path, in backend space, the stroke can reach along
    /// each axis.
    #[must_use]
    pub fn max_distance_from_path(&self, path: &PathFixed, ctm: &Matrix) -> (f64, f64) {
        let mut expansion = 0.5;
        if self.line_cap == LineCap::Square {
            expansion = core::f64::consts::FRAC_1_SQRT_2;
        }
        if matches!(self.line_join, LineJoin::Miter | LineJoin::MiterClip)
            && !path.stroke_is_rectilinear()
            && expansion < SQRT_2 * self.miter_limit
        {
            expansion = SQRT_2 * self.miter_limit;
        }
        expansion *= self.line_width;

        if ctm.has_unity_scale() {
            (expansion, expansion)
        } else {
            (
                expansion * ctm.xx.hypot(ctm.xy),
                expansion * ctm.yy.hypot(ctm.yx),
            )
        }
    }
}

/// The integer rectangle the stroke of `path` could touch, from the path's
/// point extents alone.
#[must_use]
pub fn approximate_stroke_extents(path: &PathFixed, style: &StrokeStyle, ctm: &Matrix) -> Rectangle {
    if style.line_width <= 0.0 {
        return Rectangle::default();
    }

    match path.extents() {
        Some(extents) => {
            let (dx, dy) = style.max_distance_from_path(path, ctm);
            let (x1, y1, x2, y2) = extents.to_f64();
            FixedBox::from_f64(x1 - dx, y1 - dy, x2 + dx, y2 + dy).round_to_rectangle()
        }
        None => Rectangle::default(),
    }
}

/// Add the outline of the stroke of `path` to `polygon`. The polygon must be
/// filled with the non-zero rule.
///
/// `path` is in backend space; `ctm` maps user space to backend space and the
/// style is measured in user space.
pub fn stroke_to_polygon(
    path: &PathFixed,
    style: &StrokeStyle,
    ctm: &Matrix,
    ctm_inverse: &Matrix,
    tolerance: f64,
    polygon: &mut Polygon,
) {
    if style.line_width <= 0.0 || !style.line_width.is_finite() {
        return;
    }

    let mut collector = SubpathCollector {
        ctm_inverse,
        subpaths: Vec::new(),
        current: None,
    };
    path.interpret_flat(tolerance, &mut collector);
    collector.finish();

    let mut dash: TinyVec<[f64; 4]> = style.dash.clone();
    let mut dash_offset = style.dash_offset;
    if style.dash_can_approximate(ctm, tolerance) {
        log::trace!("dash period below tolerance, approximating");
        let (dashes, offset) = style.dash_approximate(ctm, tolerance);
        dash = dashes.iter().copied().collect();
        dash_offset = offset;
    }

    let mut stroker = Stroker::new(style, ctm, tolerance, polygon);
    for subpath in &collector.subpaths {
        if dash.is_empty() {
            stroker.stroke_piece(&Piece::from_subpath(subpath));
        } else {
            for piece in dash_subpath(subpath, &dash, dash_offset) {
                stroker.stroke_piece(&piece);
            }
        }
    }
}

/// Whether `(x, y)` in backend space is covered by the stroke of `path`.
#[must_use]
pub fn in_stroke(
    path: &PathFixed,
    style: &StrokeStyle,
    ctm: &Matrix,
    ctm_inverse: &Matrix,
    tolerance: f64,
    x: f64,
    y: f64,
) -> bool {
    let mut polygon = Polygon::new();
    stroke_to_polygon(path, style, ctm, ctm_inverse, tolerance, &mut polygon);
    polygon.contains_point(x, y, FillRule::NonZero)
}

/// The exact backend space bounds of the stroke of `path`, as
/// `(x1, y1, x2, y2)`.
#[must_use]
pub fn stroke_extents(
    path: &PathFixed,
    style: &StrokeStyle,
    ctm: &Matrix,
    ctm_inverse: &Matrix,
    tolerance: f64,
) -> Option<(f64, f64, f64, f64)> {
    let mut polygon = Polygon::new();
    stroke_to_polygon(path, style, ctm, ctm_inverse, tolerance, &mut polygon);
    polygon.extents()
}

type UserPoint = Point<f64>;
type UserVector = Vector<f64>;

/// A flattened subpath in user space.
#[derive(Debug, Clone)]
struct Subpath {
    points: Vec<UserPoint>,
    closed: bool,
}

/// Collects flattened subpaths, mapped back into user space.
struct SubpathCollector<'a> {
    ctm_inverse: &'a Matrix,
    subpaths: Vec<Subpath>,
    current: Option<Subpath>,
}

impl<'a> SubpathCollector<'a> {
    fn map(&self, p: FixedPoint) -> UserPoint {
        let (x, y) = p.to_f64();
        let (x, y) = self.ctm_inverse.transform_point(x, y);
        point(x, y)
    }

    fn finish(&mut self) {
        if let Some(mut subpath) = self.current.take() {
            // a closed subpath may repeat its first point at the end
            if subpath.closed && subpath.points.len() > 1 && subpath.points.first() == subpath.points.last() {
                subpath.points.pop();
            }
            self.subpaths.push(subpath);
        }
    }
}

impl<'a> PathSink for SubpathCollector<'a> {
    fn move_to(&mut self, p: FixedPoint) {
        self.finish();
        self.current = Some(Subpath {
            points: alloc::vec![self.map(p)],
            closed: false,
        });
    }

    fn line_to(&mut self, p: FixedPoint) {
        let p = self.map(p);
        if let Some(subpath) = self.current.as_mut() {
            if subpath.points.last() != Some(&p) {
                subpath.points.push(p);
            }
        }
    }

    fn curve_to(&mut self, _b: FixedPoint, _c: FixedPoint, d: FixedPoint) {
        self.line_to(d);
    }

    fn close_path(&mut self) {
        if let Some(subpath) = self.current.as_mut() {
            subpath.closed = true;
        }
        self.finish();
    }
}

/// A polyline that gets stroked as a unit: a whole subpath, or one dash.
#[derive(Debug, Clone)]
struct Piece {
    points: Vec<UserPoint>,
    closed: bool,
    /// Which way a degenerate piece faces, for its square caps.
    direction: UserVector,
}

impl Piece {
    fn from_subpath(subpath: &Subpath) -> Piece {
        Piece {
            points: subpath.points.clone(),
            closed: subpath.closed && subpath.points.len() > 1,
            direction: vector(1.0, 0.0),
        }
    }
}

fn push_distinct(points: &mut Vec<UserPoint>, p: UserPoint) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// Cut a subpath into the pieces that the dash pattern leaves on.
fn dash_subpath(subpath: &Subpath, dash: &[f64], offset: f64) -> Vec<Piece> {
    let mut pieces = Vec::new();

    let mut index = 0;
    let mut on = true;
    let mut offset = offset;
    while offset > 0.0 && offset >= dash[index] {
        offset -= dash[index];
        on = !on;
        index = (index + 1) % dash.len();
    }
    let mut remain = dash[index] - offset;

    let points = &subpath.points;
    if points.len() < 2 {
        // a dot is drawn if the pattern is on where it sits
        if on {
            pieces.push(Piece::from_subpath(subpath));
        }
        return pieces;
    }

    let starts_on = on;
    let mut toggled = false;
    let mut current: Option<Piece> = if on {
        Some(Piece {
            points: alloc::vec![points[0]],
            closed: false,
            direction: vector(1.0, 0.0),
        })
    } else {
        None
    };

    let count = if subpath.closed { points.len() } else { points.len() - 1 };
    for i in 0..count {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let delta = b - a;
        let length = delta.length();
        if length <= DASH_EPSILON {
            continue;
        }
        let dir = delta / length;

        if let Some(piece) = current.as_mut() {
            if piece.points.len() == 1 {
                piece.direction = dir;
            }
        }

        let mut t = 0.0;
        loop {
            let step = remain.min(length - t);
            t += step;
            remain -= step;

            if let Some(piece) = current.as_mut() {
                push_distinct(&mut piece.points, a + dir * t);
            }

            if remain > DASH_EPSILON {
                break;
            }

            // the current dash or gap is used up
            toggled = true;
            on = !on;
            index = (index + 1) % dash.len();
            remain = dash[index];

            let here = a + dir * t;
            if on {
                current = Some(Piece {
                    points: alloc::vec![here],
                    closed: false,
                    direction: dir,
                });
            } else if let Some(piece) = current.take() {
                pieces.push(piece);
            }

            if t >= length - DASH_EPSILON && remain > DASH_EPSILON {
                break;
            }
        }
    }

    if let Some(mut last) = current.take() {
        if !subpath.closed && last.points.len() == 1 {
            // a dash that starts right at the end of an open subpath has no
            // length to draw
        } else if subpath.closed && !toggled {
            // the dash covers the whole closed subpath
            last.closed = true;
            last.points.pop();
            pieces.push(last);
        } else if subpath.closed && starts_on && !pieces.is_empty() {
            // the dash running over the start joins the first one
            let first = pieces.remove(0);
            for p in first.points {
                push_distinct(&mut last.points, p);
            }
            pieces.push(last);
        } else {
            pieces.push(last);
        }
    }

    pieces
}

#[inline]
fn perp(v: UserVector) -> UserVector {
    vector(-v.y, v.x)
}

#[inline]
fn rotate(v: UserVector, angle: f64) -> UserVector {
    let (sin, cos) = angle.sin_cos();
    vector(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

struct Stroker<'a> {
    style: &'a StrokeStyle,
    ctm: &'a Matrix,
    half_width: f64,
    arc_step: f64,
    polygon: &'a mut Polygon,
    scratch: Vec<UserPoint>,
}

impl<'a> Stroker<'a> {
    fn new(
        style: &'a StrokeStyle,
        ctm: &'a Matrix,
        tolerance: f64,
        polygon: &'a mut Polygon,
    ) -> Stroker<'a> {
        let half_width = style.line_width / 2.0;

        // the angle an arc segment can span while staying within tolerance
        // of the circle, measured in backend space
        let radius = ctm.transformed_circle_major_axis(half_width);
        let arc_step = if radius > tolerance {
            (2.0 * (1.0 - tolerance / radius).acos()).clamp(0.01, FRAC_PI_2)
        } else {
            FRAC_PI_2
        };

        Stroker {
            style,
            ctm,
            half_width,
            arc_step,
            polygon,
            scratch: Vec::new(),
        }
    }

    /// Add the shape in `scratch`, wound positively.
    fn emit(&mut self) {
        let pts = core::mem::take(&mut self.scratch);

        let area: f64 = pts
            .iter()
            .zip(pts.iter().cycle().skip(1))
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum();

        if area.abs() > f64::EPSILON {
            let ctm = self.ctm;
            let map = |p: &UserPoint| {
                let (x, y) = ctm.transform_point(p.x, p.y);
                point(x, y)
            };

            if area > 0.0 {
                self.polygon.add_closed(pts.iter().map(map));
            } else {
                self.polygon.add_closed(pts.iter().rev().map(map));
            }
        }

        self.scratch = pts;
        self.scratch.clear();
    }

    /// Push the points of an arc of radius `start.length()` around `center`.
    fn push_arc(&mut self, center: UserPoint, start: UserVector, sweep: f64) {
        let steps = (sweep.abs() / self.arc_step).ceil().max(1.0);
        // truncation is fine, the step count is small and positive
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = steps as usize;
        for k in 0..=n {
            #[allow(clippy::cast_precision_loss)]
            let angle = sweep * (k as f64) / steps;
            self.scratch.push(center + rotate(start, angle));
        }
    }

    fn stroke_piece(&mut self, piece: &Piece) {
        if piece.points.len() == 1 {
            self.dot(piece.points[0], piece.direction);
            return;
        }

        let pts = &piece.points;
        let count = if piece.closed { pts.len() } else { pts.len() - 1 };

        let mut dirs = Vec::with_capacity(count);
        for i in 0..count {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            let dir = (b - a).normalize();
            dirs.push(dir);

            let n = perp(dir) * self.half_width;
            self.scratch.extend_from_slice(&[a + n, b + n, b - n, a - n]);
            self.emit();
        }

        for i in 1..count {
            self.join(pts[i], dirs[i - 1], dirs[i]);
        }

        if piece.closed {
            self.join(pts[0], dirs[count - 1], dirs[0]);
        } else {
            self.cap(pts[0], -dirs[0]);
            self.cap(pts[pts.len() - 1], dirs[count - 1]);
        }
    }

    fn dot(&mut self, center: UserPoint, direction: UserVector) {
        let hw = self.half_width;
        match self.style.line_cap {
            LineCap::Butt => {}
            LineCap::Round => {
                self.push_arc(center, vector(hw, 0.0), 2.0 * PI);
                self.scratch.pop();
                self.emit();
            }
            LineCap::Square => {
                let d = direction * hw;
                let n = perp(direction) * hw;
                self.scratch
                    .extend_from_slice(&[center + n + d, center - n + d, center - n - d, center + n - d]);
                self.emit();
            }
        }
    }

    fn cap(&mut self, p: UserPoint, dir: UserVector) {
        let n = perp(dir) * self.half_width;
        match self.style.line_cap {
            LineCap::Butt => {}
            LineCap::Round => {
                self.push_arc(p, n, -PI);
                self.emit();
            }
            LineCap::Square => {
                let d = dir * self.half_width;
                self.scratch.extend_from_slice(&[p + n, p + n + d, p - n + d, p - n]);
                self.emit();
            }
        }
    }

    fn join(&mut self, p: UserPoint, d0: UserVector, d1: UserVector) {
        let cross = d0.cross(d1);
        let dot = d0.dot(d1);

        // no turn at all
        if cross.abs() <= f64::EPSILON && dot > 0.0 {
            return;
        }

        let hw = self.half_width;
        let side = if cross > 0.0 { -1.0 } else { 1.0 };
        let u0 = perp(d0) * side;
        let u1 = perp(d1) * side;

        match self.style.line_join {
            LineJoin::Round => {
                let mut sweep = u0.cross(u1).atan2(u0.dot(u1));
                // go around the outside of the turn
                let mid = rotate(u0, sweep / 2.0);
                if mid.dot(d0 - d1) < 0.0 {
                    sweep -= sweep.signum() * 2.0 * PI;
                }
                if sweep == 0.0 {
                    return;
                }

                self.scratch.push(p);
                self.push_arc(p, u0 * hw, sweep);
                self.emit();
            }
            LineJoin::Miter | LineJoin::MiterClip
                if 2.0 <= self.style.miter_limit * self.style.miter_limit * (1.0 + dot) =>
            {
                let tip = p + (u0 + u1) * (hw / (1.0 + u0.dot(u1)));
                self.scratch
                    .extend_from_slice(&[p, p + u0 * hw, tip, p + u1 * hw]);
                self.emit();
            }
            _ => {
                // bevel, or a miter that went past the limit
                self.scratch.extend_from_slice(&[p, p + u0 * hw, p + u1 * hw]);
                self.emit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> FixedPoint {
        FixedPoint::from_f64(x, y)
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> PathFixed {
        let mut path = PathFixed::new();
        path.move_to(pt(x1, y1));
        path.line_to(pt(x2, y2));
        path
    }

    fn stroke(path: &PathFixed, style: &StrokeStyle) -> Polygon {
        let mut polygon = Polygon::new();
        let identity = Matrix::identity();
        stroke_to_polygon(path, style, &identity, &identity, 0.1, &mut polygon);
        polygon
    }

    fn style(width: f64, cap: LineCap, join: LineJoin) -> StrokeStyle {
        StrokeStyle {
            line_width: width,
            line_cap: cap,
            line_join: join,
            ..StrokeStyle::default()
        }
    }

    #[test]
    fn zero_width_strokes_nothing() {
        let path = line(0.0, 0.0, 10.0, 10.0);
        for width in [0.0, -1.0] {
            let polygon = stroke(&path, &style(width, LineCap::Round, LineJoin::Round));
            assert!(polygon.is_empty());
        }
    }

    #[test]
    fn butt_line() {
        let polygon = stroke(&line(0.0, 10.0, 100.0, 10.0), &style(4.0, LineCap::Butt, LineJoin::Miter));
        assert_eq!(polygon.extents(), Some((0.0, 8.0, 100.0, 12.0)));
        assert!(polygon.contains_point(50.0, 11.0, FillRule::NonZero));
        assert!(!polygon.contains_point(50.0, 13.0, FillRule::NonZero));
    }

    #[test]
    fn caps_extend_the_line() {
        let path = line(0.0, 10.0, 100.0, 10.0);

        let square = stroke(&path, &style(4.0, LineCap::Square, LineJoin::Miter));
        assert_eq!(square.extents(), Some((-2.0, 8.0, 102.0, 12.0)));

        let round = stroke(&path, &style(4.0, LineCap::Round, LineJoin::Miter));
        // the arcs are polygons inside the true circle
        let (x1, _, x2, _) = round.extents().unwrap();
        assert!(x1 < -1.8 && x1 >= -2.0);
        assert!(x2 > 101.8 && x2 <= 102.0);
        assert!(round.contains_point(-1.0, 10.0, FillRule::NonZero));
        assert!(!round.contains_point(-1.9, 8.2, FillRule::NonZero));
    }

    #[test]
    fn dots_are_capped() {
        let mut path = PathFixed::new();
        path.move_to(pt(5.0, 5.0));
        path.line_to(pt(5.0, 5.0));

        assert!(stroke(&path, &style(2.0, LineCap::Butt, LineJoin::Miter)).is_empty());

        let round = stroke(&path, &style(2.0, LineCap::Round, LineJoin::Miter));
        assert!(round.contains_point(5.0, 5.5, FillRule::NonZero));

        let square = stroke(&path, &style(2.0, LineCap::Square, LineJoin::Miter));
        assert_eq!(square.extents(), Some((4.0, 4.0, 6.0, 6.0)));
    }

    #[test]
    fn joins() {
        let mut corner = PathFixed::new();
        corner.move_to(pt(0.0, 0.0));
        corner.line_to(pt(10.0, 0.0));
        corner.line_to(pt(10.0, 10.0));

        // the outside of the corner is at the top right
        let miter = stroke(&corner, &style(2.0, LineCap::Butt, LineJoin::Miter));
        assert!(miter.contains_point(10.9, -0.9, FillRule::NonZero));

        let bevel = stroke(&corner, &style(2.0, LineCap::Butt, LineJoin::Bevel));
        assert!(!bevel.contains_point(10.9, -0.9, FillRule::NonZero));
        assert!(bevel.contains_point(10.4, -0.4, FillRule::NonZero));

        let round = stroke(&corner, &style(2.0, LineCap::Butt, LineJoin::Round));
        assert!(round.contains_point(10.6, -0.6, FillRule::NonZero));
        assert!(!round.contains_point(10.9, -0.9, FillRule::NonZero));

        // a low limit turns the miter into a bevel
        let mut limited = style(2.0, LineCap::Butt, LineJoin::Miter);
        limited.miter_limit = 1.0;
        assert!(!stroke(&corner, &limited).contains_point(10.9, -0.9, FillRule::NonZero));
    }

    #[test]
    fn closed_rectangle_has_no_caps() {
        let path = PathFixed::from_box(&FixedBox::from_f64(10.0, 10.0, 20.0, 20.0));
        let polygon = stroke(&path, &style(2.0, LineCap::Square, LineJoin::Miter));
        assert_eq!(polygon.extents(), Some((9.0, 9.0, 21.0, 21.0)));
        assert!(!polygon.contains_point(15.0, 15.0, FillRule::NonZero));
        assert!(polygon.contains_point(9.5, 15.0, FillRule::NonZero));
    }

    #[test]
    fn dash_validation() {
        let mut style = StrokeStyle::default();
        assert_eq!(style.set_dash(&[1.0, -1.0], 0.0), Err(InvalidDash));
        assert_eq!(style.set_dash(&[0.0, 0.0], 0.0), Err(InvalidDash));
        assert!(!style.is_dashed());

        style.set_dash(&[3.0], -1.0).unwrap();
        assert_eq!(style.dash(), &[3.0, 3.0]);
        assert_relative_eq!(style.dash_offset(), 5.0);

        style.set_dash(&[], 0.0).unwrap();
        assert!(!style.is_dashed());
    }

    #[test]
    fn dashes_split_the_line() {
        let mut style = style(2.0, LineCap::Butt, LineJoin::Miter);
        style.set_dash(&[10.0, 10.0], 0.0).unwrap();

        let polygon = stroke(&line(0.0, 0.0, 100.0, 0.0), &style);
        assert!(polygon.contains_point(5.0, 0.0, FillRule::NonZero));
        assert!(!polygon.contains_point(15.0, 0.0, FillRule::NonZero));
        assert!(polygon.contains_point(25.0, 0.0, FillRule::NonZero));

        // the offset shifts the pattern along
        style.set_dash(&[10.0, 10.0], 10.0).unwrap();
        let polygon = stroke(&line(0.0, 0.0, 100.0, 0.0), &style);
        assert!(!polygon.contains_point(5.0, 0.0, FillRule::NonZero));
        assert!(polygon.contains_point(15.0, 0.0, FillRule::NonZero));
    }

    #[test]
    fn dash_approximation_keeps_coverage() {
        let mut style = style(1.0, LineCap::Butt, LineJoin::Miter);
        style.set_dash(&[0.01, 0.03, 0.02, 0.04], 0.0).unwrap();

        let ctm = Matrix::identity();
        assert!(style.dash_can_approximate(&ctm, 0.5));

        let ([on, off], _) = style.dash_approximate(&ctm, 0.5);
        assert_relative_eq!(on / (on + off), 0.03 / 0.1, epsilon = 1e-12);
        assert_relative_eq!(on + off, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn extents_expansion() {
        let path = line(0.0, 0.0, 10.0, 10.0);
        let ctm = Matrix::identity();

        let round = style(2.0, LineCap::Round, LineJoin::Round);
        assert_eq!(round.max_distance_from_path(&path, &ctm), (1.0, 1.0));

        let square = style(2.0, LineCap::Square, LineJoin::Bevel);
        let (dx, _) = square.max_distance_from_path(&path, &ctm);
        assert_relative_eq!(dx, 2.0 * core::f64::consts::FRAC_1_SQRT_2);

        let miter = style(2.0, LineCap::Butt, LineJoin::Miter);
        let (dx, _) = miter.max_distance_from_path(&path, &ctm);
        assert_relative_eq!(dx, 2.0 * SQRT_2 * 10.0);

        let scaled = Matrix::scaling(3.0, 1.0);
        assert_eq!(round.max_distance_from_path(&path, &scaled), (3.0, 1.0));

        let exact = stroke_extents(&path, &round, &ctm, &ctm, 0.1).unwrap();
        let approx = approximate_stroke_extents(&path, &round, &ctm);
        assert!(f64::from(approx.x) <= exact.0 && f64::from(approx.x2()) >= exact.2);
    }
}
