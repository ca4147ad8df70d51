// MIT/Apache2 License

use crate::{
    state::{State, StateStack},
    Error, Pattern, Result, Surface,
};
use approx::abs_diff_eq;
use core::f64::consts::PI;
use easel_geometry::{
    Antialias, FillRule, Fixed, FixedPoint, LineCap, LineJoin, Matrix, Operator, PathFixed,
    PathSink, RectangleF,
};
use lyon_geom::{point, vector, Angle, Arc};

/// Arcs sweeping further than this many full circles are cut short.
const MAX_FULL_CIRCLES: f64 = 65536.0;

/// A stateful handle for drawing onto a [`Surface`].
///
/// The `Context` is where drawing actually happens. It holds a stack of drawing parameters (the operator, the
/// source, the current transformation matrix, the clip, the stroke style and so on) that can be pushed with
/// `save()` and popped with `restore()`, as well as the path currently being built.
///
/// # Coordinates
///
/// Everything passed to a `Context` is in "user space". The current transformation matrix maps user space onto
/// the device space of the target, and the target's device transform maps that onto the space its backend draws
/// in. Points are transformed as soon as they are added to the path, so changing the matrix halfway through
/// building a path only affects the points added afterwards.
///
/// # Errors
///
/// The first error any operation runs into is remembered. From then on, every fallible call returns that error
/// without doing anything, and path building calls are ignored, until `reset_status()` is called.
#[derive(Debug)]
pub struct Context {
    states: StateStack,
    path: PathFixed,
    status: Option<Error>,
}

/// One element of a path, in user space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathData {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
}

impl Context {
    /// Create a new context drawing onto `target`. If the target is unusable, the context starts out in its
    /// error state.
    pub fn new(target: &Surface) -> Context {
        let status = match target.status() {
            Err(err) => Some(err),
            Ok(()) if target.is_finished() => Some(Error::SurfaceFinished),
            Ok(()) => None,
        };

        Context {
            states: StateStack::new(target.clone()),
            path: PathFixed::new(),
            status,
        }
    }

    #[inline]
    fn state(&self) -> &State {
        self.states.current()
    }

    #[inline]
    fn state_mut(&mut self) -> &mut State {
        self.states.current_mut()
    }

    /* Status */

    /// The sticky error status of this context.
    #[inline]
    pub fn status(&self) -> Result {
        match self.status {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Leave the error state.
    #[inline]
    pub fn reset_status(&mut self) {
        self.status = None;
    }

    /// Remember the first error that happens.
    fn record(&mut self, result: Result) -> Result {
        if let Err(err) = result {
            if self.status.is_none() {
                log::warn!("context entered error state: {}", err);
                self.status = Some(err);
            }
        }
        result
    }

    /// Run `f` unless the context is in its error state, and remember what it returns.
    #[inline]
    fn run<F: FnOnce(&mut Context) -> Result>(&mut self, f: F) -> Result {
        self.status()?;
        let result = f(self);
        self.record(result)
    }

    #[inline]
    pub fn target(&self) -> &Surface {
        &self.state().target
    }

    /* State stack */

    /// Push a copy of the current drawing parameters.
    #[inline]
    pub fn save(&mut self) -> Result {
        self.run(|cx| cx.states.save())
    }

    /// Pop the drawing parameters pushed by the last `save()`.
    #[inline]
    pub fn restore(&mut self) -> Result {
        self.run(|cx| cx.states.restore())
    }

    /* Source */

    pub fn set_source(&mut self, source: &Pattern) -> Result {
        self.run(|cx| {
            source.status()?;
            cx.state_mut().set_source(source.clone());
            Ok(())
        })
    }

    #[inline]
    pub fn set_source_rgb(&mut self, red: f64, green: f64, blue: f64) -> Result {
        self.set_source(&Pattern::rgb(red, green, blue))
    }

    #[inline]
    pub fn set_source_rgba(&mut self, red: f64, green: f64, blue: f64, alpha: f64) -> Result {
        self.set_source(&Pattern::rgba(red, green, blue, alpha))
    }

    /// Use `surface` as the source, with its origin at `(x, y)` in user space.
    pub fn set_source_surface(&mut self, surface: &Surface, x: f64, y: f64) -> Result {
        self.run(|cx| {
            let pattern = placed_surface(surface, x, y)?;
            cx.state_mut().set_source(pattern);
            Ok(())
        })
    }

    #[inline]
    pub fn source(&self) -> &Pattern {
        &self.state().source
    }

    /* Parameters */

    #[inline]
    pub fn set_operator(&mut self, op: Operator) {
        if self.status.is_none() {
            self.state_mut().op = op;
        }
    }

    #[inline]
    pub fn operator(&self) -> Operator {
        self.state().op
    }

    /// Set the opacity applied to everything drawn. It is clamped to `[0, 1]`.
    #[inline]
    pub fn set_opacity(&mut self, opacity: f64) {
        if self.status.is_none() {
            self.state_mut().opacity = if opacity.is_nan() {
                0.0
            } else {
                opacity.clamp(0.0, 1.0)
            };
        }
    }

    #[inline]
    pub fn opacity(&self) -> f64 {
        self.state().opacity
    }

    /// Set how far flattened curves may stray from the real ones, in device pixels.
    #[inline]
    pub fn set_tolerance(&mut self, tolerance: f64) {
        if self.status.is_none() {
            self.state_mut().set_tolerance(tolerance);
        }
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.state().tolerance
    }

    #[inline]
    pub fn set_antialias(&mut self, antialias: Antialias) {
        if self.status.is_none() {
            self.state_mut().antialias = antialias;
        }
    }

    #[inline]
    pub fn antialias(&self) -> Antialias {
        self.state().antialias
    }

    #[inline]
    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        if self.status.is_none() {
            self.state_mut().fill_rule = fill_rule;
        }
    }

    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.state().fill_rule
    }

    #[inline]
    pub fn set_line_width(&mut self, width: f64) {
        if self.status.is_none() {
            self.state_mut().stroke_style.line_width = width;
        }
    }

    #[inline]
    pub fn line_width(&self) -> f64 {
        self.state().stroke_style.line_width
    }

    #[inline]
    pub fn set_line_cap(&mut self, cap: LineCap) {
        if self.status.is_none() {
            self.state_mut().stroke_style.line_cap = cap;
        }
    }

    #[inline]
    pub fn line_cap(&self) -> LineCap {
        self.state().stroke_style.line_cap
    }

    #[inline]
    pub fn set_line_join(&mut self, join: LineJoin) {
        if self.status.is_none() {
            self.state_mut().stroke_style.line_join = join;
        }
    }

    #[inline]
    pub fn line_join(&self) -> LineJoin {
        self.state().stroke_style.line_join
    }

    #[inline]
    pub fn set_miter_limit(&mut self, limit: f64) {
        if self.status.is_none() {
            self.state_mut().stroke_style.miter_limit = limit;
        }
    }

    #[inline]
    pub fn miter_limit(&self) -> f64 {
        self.state().stroke_style.miter_limit
    }

    /// Set the dash pattern used when stroking. An empty slice turns dashing off.
    pub fn set_dash(&mut self, dashes: &[f64], offset: f64) -> Result {
        self.run(|cx| {
            cx.state_mut().stroke_style.set_dash(dashes, offset)?;
            Ok(())
        })
    }

    /// The dash pattern and its offset.
    #[inline]
    pub fn dash(&self) -> (&[f64], f64) {
        let style = &self.state().stroke_style;
        (style.dash(), style.dash_offset())
    }

    /* Transformations */

    #[inline]
    pub fn translate(&mut self, tx: f64, ty: f64) -> Result {
        self.transform(&Matrix::translation(tx, ty))
    }

    #[inline]
    pub fn scale(&mut self, sx: f64, sy: f64) -> Result {
        self.transform(&Matrix::scaling(sx, sy))
    }

    #[inline]
    pub fn rotate(&mut self, radians: f64) -> Result {
        self.transform(&Matrix::rotation(radians))
    }

    /// Apply `matrix` to user space before the current transformation.
    pub fn transform(&mut self, matrix: &Matrix) -> Result {
        self.run(|cx| cx.state_mut().transform(matrix))
    }

    pub fn set_matrix(&mut self, matrix: &Matrix) -> Result {
        self.run(|cx| cx.state_mut().set_matrix(matrix))
    }

    #[inline]
    pub fn identity_matrix(&mut self) {
        if self.status.is_none() {
            self.state_mut().identity_matrix();
        }
    }

    /// The current transformation matrix.
    #[inline]
    pub fn matrix(&self) -> Matrix {
        *self.state().ctm.forward()
    }

    #[inline]
    pub fn user_to_device(&self, x: f64, y: f64) -> (f64, f64) {
        self.state().ctm.forward().transform_point(x, y)
    }

    #[inline]
    pub fn user_to_device_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        self.state().ctm.forward().transform_distance(dx, dy)
    }

    #[inline]
    pub fn device_to_user(&self, x: f64, y: f64) -> (f64, f64) {
        self.state().ctm.inverse().transform_point(x, y)
    }

    #[inline]
    pub fn device_to_user_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        self.state().ctm.inverse().transform_distance(dx, dy)
    }

    /* Path building */

    /// Throw away the current path.
    #[inline]
    pub fn new_path(&mut self) {
        if self.status.is_none() {
            self.path = PathFixed::new();
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.status.is_none() {
            let point = self.state().user_to_fixed(x, y);
            self.path.move_to(point);
        }
    }

    /// Start a new subpath without a current point, so that the next segment begins wherever it starts.
    #[inline]
    pub fn new_sub_path(&mut self) {
        if self.status.is_none() {
            self.path.new_sub_path();
        }
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.status.is_none() {
            let point = self.state().user_to_fixed(x, y);
            self.path.line_to(point);
        }
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        if self.status.is_none() {
            let state = self.state();
            let (b, c, d) = (
                state.user_to_fixed(x1, y1),
                state.user_to_fixed(x2, y2),
                state.user_to_fixed(x3, y3),
            );
            self.path.curve_to(b, c, d);
        }
    }

    #[inline]
    pub fn close_path(&mut self) {
        if self.status.is_none() {
            self.path.close_path();
        }
    }

    /// The current point moved by a user space distance.
    fn relative_point(&self, dx: f64, dy: f64) -> Result<FixedPoint> {
        let current = self.path.current_point().ok_or(Error::NoCurrentPoint)?;
        let (dx, dy) = self.state().user_to_backend().transform_distance(dx, dy);
        Ok(current.translate(Fixed::from_f64(dx), Fixed::from_f64(dy)))
    }

    pub fn rel_move_to(&mut self, dx: f64, dy: f64) -> Result {
        self.run(|cx| {
            let point = cx.relative_point(dx, dy)?;
            cx.path.move_to(point);
            Ok(())
        })
    }

    pub fn rel_line_to(&mut self, dx: f64, dy: f64) -> Result {
        self.run(|cx| {
            let point = cx.relative_point(dx, dy)?;
            cx.path.line_to(point);
            Ok(())
        })
    }

    pub fn rel_curve_to(
        &mut self,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
        dx3: f64,
        dy3: f64,
    ) -> Result {
        self.run(|cx| {
            let b = cx.relative_point(dx1, dy1)?;
            let c = cx.relative_point(dx2, dy2)?;
            let d = cx.relative_point(dx3, dy3)?;
            cx.path.curve_to(b, c, d);
            Ok(())
        })
    }

    /// Add a closed rectangle as its own subpath.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Add a circular arc around `(xc, yc)`, going from `angle1` to `angle2` in the direction of increasing
    /// angles. A line is drawn from the current point to the start of the arc, if there is one.
    pub fn arc(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) {
        let mut angle2 = angle2;
        if angle2 < angle1 {
            angle2 = (angle2 - angle1) % (2.0 * PI);
            if angle2 < 0.0 {
                angle2 += 2.0 * PI;
            }
            angle2 += angle1;
        }
        self.arc_path(xc, yc, radius, angle1, angle2);
    }

    /// Add a circular arc going from `angle1` to `angle2` in the direction of decreasing angles.
    pub fn arc_negative(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) {
        let mut angle2 = angle2;
        if angle2 > angle1 {
            angle2 = (angle2 - angle1) % (2.0 * PI);
            if angle2 > 0.0 {
                angle2 -= 2.0 * PI;
            }
            angle2 += angle1;
        }
        self.arc_path(xc, yc, radius, angle1, angle2);
    }

    fn arc_path(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) {
        if self.status.is_some() {
            return;
        }
        if !(radius > 0.0) {
            self.line_to(xc, yc);
            return;
        }

        let limit = 2.0 * PI * MAX_FULL_CIRCLES;
        let sweep = (angle2 - angle1).clamp(-limit, limit);

        // quarter turns or less at a time
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pieces = ((sweep.abs() / (PI / 2.0)).ceil() as usize).max(1);
        #[allow(clippy::cast_precision_loss)]
        let step = sweep / pieces as f64;

        let start = (xc + radius * angle1.cos(), yc + radius * angle1.sin());
        self.line_to(start.0, start.1);
        if abs_diff_eq!(sweep, 0.0) {
            return;
        }

        for i in 0..pieces {
            #[allow(clippy::cast_precision_loss)]
            let arc = Arc {
                center: point(xc, yc),
                radii: vector(radius, radius),
                start_angle: Angle {
                    radians: angle1 + step * i as f64,
                },
                sweep_angle: Angle { radians: step },
                x_rotation: Angle { radians: 0.0 },
            };
            arc.for_each_cubic_bezier(&mut |bezier| {
                self.curve_to(
                    bezier.ctrl1.x,
                    bezier.ctrl1.y,
                    bezier.ctrl2.x,
                    bezier.ctrl2.y,
                    bezier.to.x,
                    bezier.to.y,
                );
            });
        }
    }

    /// Append a path, in user space, to the current one.
    pub fn append_path(&mut self, path: &[PathData]) {
        for item in path {
            match *item {
                PathData::MoveTo(x, y) => self.move_to(x, y),
                PathData::LineTo(x, y) => self.line_to(x, y),
                PathData::CurveTo(x1, y1, x2, y2, x3, y3) => self.curve_to(x1, y1, x2, y2, x3, y3),
                PathData::ClosePath => self.close_path(),
            }
        }
    }

    /* Path queries */

    /// The current point in user space, if there is one.
    #[inline]
    pub fn current_point(&self) -> Option<(f64, f64)> {
        self.path
            .current_point()
            .map(|point| self.state().fixed_to_user(point))
    }

    #[inline]
    pub fn has_current_point(&self) -> bool {
        self.path.has_current_point()
    }

    /// The bounds of the points of the current path, in user space.
    pub fn path_extents(&self) -> (f64, f64, f64, f64) {
        match self.path.extents() {
            Some(extents) => {
                let (x1, y1, x2, y2) = extents.to_f64();
                self.state().backend_to_user_box(x1, y1, x2, y2)
            }
            None => (0.0, 0.0, 0.0, 0.0),
        }
    }

    /// A copy of the current path in user space.
    pub fn copy_path(&self) -> Result<Vec<PathData>> {
        self.status()?;
        let mut collector = PathCollector {
            state: self.state(),
            data: Vec::with_capacity(self.path.segments().len()),
        };
        self.path.interpret(&mut collector);
        Ok(collector.data)
    }

    /// A copy of the current path in user space, with curves flattened into lines.
    pub fn copy_path_flat(&self) -> Result<Vec<PathData>> {
        self.status()?;
        let mut collector = PathCollector {
            state: self.state(),
            data: Vec::new(),
        };
        self.path.interpret_flat(self.state().tolerance, &mut collector);
        Ok(collector.data)
    }

    /* Drawing */

    /// Draw the source everywhere within the clip.
    #[inline]
    pub fn paint(&mut self) -> Result {
        self.run(|cx| cx.state().paint())
    }

    /// Draw the source everywhere within the clip, at a reduced opacity.
    pub fn paint_with_alpha(&mut self, alpha: f64) -> Result {
        if alpha >= 1.0 {
            return self.paint();
        }
        if !(alpha > 0.0) && self.operator().is_bounded_by_mask() {
            return self.status();
        }
        self.mask(&Pattern::rgba(0.0, 0.0, 0.0, alpha))
    }

    /// Draw the source through the alpha of `mask`.
    #[inline]
    pub fn mask(&mut self, mask: &Pattern) -> Result {
        self.run(|cx| cx.state().mask(mask))
    }

    /// Draw the source through the alpha of `surface`, placed at `(x, y)` in user space.
    pub fn mask_surface(&mut self, surface: &Surface, x: f64, y: f64) -> Result {
        self.run(|cx| {
            let pattern = placed_surface(surface, x, y)?;
            cx.state().mask(&pattern)
        })
    }

    /// Fill the current path and then clear it.
    pub fn fill(&mut self) -> Result {
        self.fill_preserve()?;
        self.path = PathFixed::new();
        Ok(())
    }

    /// Fill the current path, keeping it.
    #[inline]
    pub fn fill_preserve(&mut self) -> Result {
        self.run(|cx| cx.state().fill(&cx.path))
    }

    /// Stroke the current path and then clear it.
    pub fn stroke(&mut self) -> Result {
        self.stroke_preserve()?;
        self.path = PathFixed::new();
        Ok(())
    }

    /// Stroke the current path, keeping it.
    #[inline]
    pub fn stroke_preserve(&mut self) -> Result {
        self.run(|cx| cx.state().stroke(&cx.path))
    }

    /* Clipping */

    /// Restrict the clip to the fill of the current path and then clear the path.
    pub fn clip(&mut self) -> Result {
        self.clip_preserve()?;
        self.path = PathFixed::new();
        Ok(())
    }

    /// Restrict the clip to the fill of the current path, keeping it.
    pub fn clip_preserve(&mut self) -> Result {
        self.run(|cx| {
            let path = &cx.path;
            cx.states.current_mut().clip(path);
            Ok(())
        })
    }

    /// Allow drawing anywhere again.
    #[inline]
    pub fn reset_clip(&mut self) {
        if self.status.is_none() {
            self.state_mut().reset_clip();
        }
    }

    /// The bounds of the clip, in user space.
    #[inline]
    pub fn clip_extents(&self) -> (f64, f64, f64, f64) {
        self.state().clip_extents()
    }

    /// The clip as a list of rectangles in user space. Fails with
    /// [`Error::ClipNotRepresentable`] if it is not made of rectangles aligned with user space.
    pub fn copy_clip_rectangle_list(&self) -> Result<Vec<RectangleF>> {
        self.status()?;
        self.state().clip_rectangles()
    }

    /* Hit testing */

    #[inline]
    pub fn in_fill(&self, x: f64, y: f64) -> bool {
        self.status.is_none() && self.state().in_fill(&self.path, x, y)
    }

    #[inline]
    pub fn in_stroke(&self, x: f64, y: f64) -> bool {
        self.status.is_none() && self.state().in_stroke(&self.path, x, y)
    }

    #[inline]
    pub fn in_clip(&self, x: f64, y: f64) -> bool {
        self.status.is_none() && self.state().in_clip(x, y)
    }

    /// The bounds of the area filling the current path would cover, in user space.
    #[inline]
    pub fn fill_extents(&self) -> (f64, f64, f64, f64) {
        self.state().fill_extents(&self.path)
    }

    /// The bounds of the area stroking the current path would cover, in user space.
    #[inline]
    pub fn stroke_extents(&self) -> (f64, f64, f64, f64) {
        self.state().stroke_extents(&self.path)
    }

    /// Finish any drawing the target has pending.
    #[inline]
    pub fn flush(&mut self) -> Result {
        self.run(|cx| cx.target().flush())
    }
}

/// A pattern showing `surface` with its origin at `(x, y)`.
fn placed_surface(surface: &Surface, x: f64, y: f64) -> Result<Pattern> {
    let mut pattern = Pattern::for_surface(surface);
    pattern.set_matrix(&Matrix::translation(-x, -y))?;
    Ok(pattern)
}

/// Collects a backend space path as user space path data.
struct PathCollector<'a> {
    state: &'a State,
    data: Vec<PathData>,
}

impl PathSink for PathCollector<'_> {
    fn move_to(&mut self, point: FixedPoint) {
        let (x, y) = self.state.fixed_to_user(point);
        self.data.push(PathData::MoveTo(x, y));
    }

    fn line_to(&mut self, point: FixedPoint) {
        let (x, y) = self.state.fixed_to_user(point);
        self.data.push(PathData::LineTo(x, y));
    }

    fn curve_to(&mut self, b: FixedPoint, c: FixedPoint, d: FixedPoint) {
        let (x1, y1) = self.state.fixed_to_user(b);
        let (x2, y2) = self.state.fixed_to_user(c);
        let (x3, y3) = self.state.fixed_to_user(d);
        self.data.push(PathData::CurveTo(x1, y1, x2, y2, x3, y3));
    }

    fn close_path(&mut self) {
        self.data.push(PathData::ClosePath);
    }
}

#[cfg(all(test, feature = "image"))]
mod tests {
    use super::*;
    use crate::Format;
    use approx::assert_abs_diff_eq;

    fn context() -> Context {
        let _ = env_logger::builder().is_test(true).try_init();
        Context::new(&Surface::image(Format::Argb32, 50, 50).unwrap())
    }

    #[test]
    fn errors_are_sticky() {
        let mut cx = context();
        assert_eq!(cx.scale(0.0, 0.0), Err(Error::InvalidMatrix));
        assert_eq!(cx.paint(), Err(Error::InvalidMatrix));

        // path building is ignored in the meantime
        cx.move_to(1.0, 1.0);
        assert_eq!(cx.current_point(), None);

        cx.reset_status();
        assert!(cx.paint().is_ok());
    }

    #[test]
    fn surface_placement_errors_are_sticky() {
        let image = Surface::image(Format::Argb32, 4, 4).unwrap();

        let mut cx = context();
        assert_eq!(
            cx.set_source_surface(&image, f64::NAN, 0.0),
            Err(Error::InvalidMatrix)
        );
        assert_eq!(cx.status(), Err(Error::InvalidMatrix));

        let mut cx = context();
        assert_eq!(
            cx.mask_surface(&image, 0.0, f64::INFINITY),
            Err(Error::InvalidMatrix)
        );
        assert_eq!(cx.paint(), Err(Error::InvalidMatrix));
    }

    #[test]
    fn relative_without_current_point() {
        let mut cx = context();
        assert_eq!(cx.rel_line_to(1.0, 1.0), Err(Error::NoCurrentPoint));
        assert_eq!(cx.status(), Err(Error::NoCurrentPoint));
    }

    #[test]
    fn relative_moves_use_user_space() {
        let mut cx = context();
        cx.scale(2.0, 2.0).unwrap();
        cx.move_to(1.0, 1.0);
        cx.rel_line_to(3.0, 0.0).unwrap();
        assert_eq!(cx.current_point(), Some((4.0, 1.0)));
        assert_eq!(cx.user_to_device(4.0, 1.0), (8.0, 2.0));
    }

    #[test]
    fn copy_path_round_trips_through_user_space() {
        let mut cx = context();
        cx.translate(10.0, 0.0).unwrap();
        cx.rectangle(1.0, 2.0, 3.0, 4.0);

        let path = cx.copy_path().unwrap();
        assert_eq!(path[0], PathData::MoveTo(1.0, 2.0));
        assert_eq!(path[2], PathData::LineTo(4.0, 6.0));
        assert!(path.contains(&PathData::ClosePath));

        cx.new_path();
        cx.append_path(&path);
        assert_eq!(cx.copy_path().unwrap(), path);
    }

    #[test]
    fn arcs() {
        let mut cx = context();
        cx.arc(20.0, 20.0, 10.0, 0.0, PI);
        let (x, y) = cx.current_point().unwrap();
        assert_abs_diff_eq!(x, 10.0, epsilon = 1e-2);
        assert_abs_diff_eq!(y, 20.0, epsilon = 1e-2);

        let (x1, y1, x2, y2) = cx.path_extents();
        assert_abs_diff_eq!(x1, 10.0, epsilon = 1e-2);
        assert_abs_diff_eq!(x2, 30.0, epsilon = 1e-2);
        assert_abs_diff_eq!(y1, 20.0, epsilon = 1e-2);
        assert!(y2 > 29.0);

        // the flattened copy holds no curves
        let flat = cx.copy_path_flat().unwrap();
        assert!(flat.iter().all(|d| !matches!(d, PathData::CurveTo(..))));
    }

    #[test]
    fn fill_and_hit_tests() {
        let mut cx = context();
        cx.rectangle(10.0, 10.0, 20.0, 20.0);
        assert!(cx.in_fill(15.0, 15.0));
        assert!(!cx.in_fill(5.0, 5.0));
        assert_eq!(cx.fill_extents(), (10.0, 10.0, 30.0, 30.0));

        cx.set_line_width(4.0);
        assert!(cx.in_stroke(10.0, 20.0));
        assert!(!cx.in_stroke(20.0, 20.0));
        let (x1, _, x2, _) = cx.stroke_extents();
        assert_abs_diff_eq!(x1, 8.0, epsilon = 1e-6);
        assert_abs_diff_eq!(x2, 32.0, epsilon = 1e-6);

        cx.fill().unwrap();
        assert!(!cx.has_current_point());
    }

    #[test]
    fn clip_queries() {
        let mut cx = context();
        assert_eq!(cx.clip_extents(), (0.0, 0.0, 50.0, 50.0));

        cx.rectangle(5.0, 5.0, 10.0, 10.0);
        cx.clip().unwrap();
        assert!(cx.in_clip(6.0, 6.0));
        assert!(!cx.in_clip(20.0, 6.0));
        assert_eq!(cx.clip_extents(), (5.0, 5.0, 15.0, 15.0));
        assert_eq!(
            cx.copy_clip_rectangle_list().unwrap(),
            vec![RectangleF::new(5.0, 5.0, 10.0, 10.0)]
        );

        cx.arc(10.0, 10.0, 3.0, 0.0, 2.0 * PI);
        cx.clip().unwrap();
        assert_eq!(
            cx.copy_clip_rectangle_list(),
            Err(Error::ClipNotRepresentable)
        );

        cx.reset_clip();
        assert!(cx.in_clip(40.0, 40.0));
    }

    #[test]
    fn dash_validation() {
        let mut cx = context();
        assert_eq!(cx.set_dash(&[-1.0, 2.0], 0.0), Err(Error::InvalidDash));
        cx.reset_status();
        cx.set_dash(&[2.0, 1.0], 0.5).unwrap();
        assert_eq!(cx.dash(), (&[2.0, 1.0][..], 0.5));
    }
}
