// MIT/Apache2 License

//! The drawing parameters saved and restored by a [`Context`](crate::Context), and the logic that turns them
//! into calls on the target surface.

use crate::{
    surface::{FillOptions, StrokeOptions},
    Color, Error, Pattern, PatternType, Result, Surface,
};
use core::mem;
use easel_geometry::{
    approximate_stroke_extents, in_stroke, stroke_extents, Antialias, Clip, FillRule, Fixed,
    FixedPoint, InvertibleMatrix, Matrix, Operator, PathFixed, Rectangle, RectangleF, StrokeStyle,
};

/// One level of saved drawing parameters.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) op: Operator,
    pub(crate) opacity: f64,
    pub(crate) tolerance: f64,
    pub(crate) antialias: Antialias,
    pub(crate) fill_rule: FillRule,
    pub(crate) stroke_style: StrokeStyle,
    /// Maps user space onto the target's device space.
    pub(crate) ctm: InvertibleMatrix,
    /// The inverse of the `ctm` at the time the source was set.
    pub(crate) source_ctm_inverse: Matrix,
    /// Where drawing is allowed, in backend space.
    pub(crate) clip: Clip,
    pub(crate) source: Pattern,
    pub(crate) target: Surface,
}

impl State {
    pub(crate) const DEFAULT_TOLERANCE: f64 = 0.1;
    pub(crate) const DEFAULT_OPERATOR: Operator = Operator::Over;
    pub(crate) const DEFAULT_FILL_RULE: FillRule = FillRule::NonZero;

    pub(crate) fn new(target: Surface) -> State {
        State {
            op: State::DEFAULT_OPERATOR,
            opacity: 1.0,
            tolerance: State::DEFAULT_TOLERANCE,
            antialias: Antialias::Default,
            fill_rule: State::DEFAULT_FILL_RULE,
            stroke_style: StrokeStyle::default(),
            ctm: InvertibleMatrix::identity(),
            source_ctm_inverse: Matrix::identity(),
            clip: Clip::unbounded(),
            source: Pattern::default(),
            target,
        }
    }

    /* Parameters */

    /// Set the tolerance, which is never finer than one fixed point unit.
    pub(crate) fn set_tolerance(&mut self, tolerance: f64) {
        let min = Fixed::EPSILON.to_f64();
        self.tolerance = if tolerance.is_nan() {
            State::DEFAULT_TOLERANCE
        } else {
            tolerance.max(min)
        };
    }

    pub(crate) fn set_source(&mut self, source: Pattern) {
        self.source = source;
        self.source_ctm_inverse = *self.ctm.inverse();
    }

    /* Transforms */

    /// Apply `matrix` before the current transform.
    pub(crate) fn transform(&mut self, matrix: &Matrix) -> Result {
        if !matrix.is_finite() {
            return Err(Error::InvalidMatrix);
        }
        self.ctm.prepend(matrix).ok_or(Error::InvalidMatrix)
    }

    pub(crate) fn set_matrix(&mut self, matrix: &Matrix) -> Result {
        if !matrix.is_finite() {
            return Err(Error::InvalidMatrix);
        }
        self.ctm.set(*matrix).ok_or(Error::InvalidMatrix)
    }

    #[inline]
    pub(crate) fn identity_matrix(&mut self) {
        self.ctm = InvertibleMatrix::identity();
    }

    /// Maps user space onto backend space.
    #[inline]
    pub(crate) fn user_to_backend(&self) -> Matrix {
        self.ctm.forward().then(&self.target.device_transform())
    }

    /// Maps backend space onto user space.
    #[inline]
    pub(crate) fn backend_to_user(&self) -> Matrix {
        self.target
            .device_transform_inverse()
            .then(self.ctm.inverse())
    }

    /// A user space point as a fixed point backend point.
    pub(crate) fn user_to_fixed(&self, x: f64, y: f64) -> FixedPoint {
        let (x, y) = self.user_to_backend().transform_point(x, y);
        FixedPoint::from_f64(x, y)
    }

    /// A fixed point backend point in user space.
    pub(crate) fn fixed_to_user(&self, point: FixedPoint) -> (f64, f64) {
        let (x, y) = point.to_f64();
        self.backend_to_user().transform_point(x, y)
    }

    /// A box in backend space as a bounding box in user space.
    pub(crate) fn backend_to_user_box(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64, f64, f64) {
        self.backend_to_user().transform_bounding_box(x1, y1, x2, y2)
    }

    /* Drawing */

    /// Whether nothing drawn right now could reach the target.
    fn clipped(&self) -> bool {
        if self.clip.is_all_clipped() {
            return true;
        }
        match self.target.extents() {
            Some(mut extents) => extents.is_empty() || !extents.intersect(self.clip.extents()),
            None => false,
        }
    }

    /// The operator to actually use for the current source.
    fn reduce_op(&self) -> Operator {
        let op = self.op;
        if op != Operator::Source {
            return op;
        }

        if self.source.is_clear() {
            log::trace!("source operator with a clear source is a clear");
            return Operator::Clear;
        }

        // on a surface without alpha, black is what clearing leaves behind
        if !self.target.content().has_alpha() {
            if let Some(color) = self.source.color() {
                if color.is_black() && self.source.opacity() >= 1.0 {
                    log::trace!("black source on an opaque surface is a clear");
                    return Operator::Clear;
                }
            }
        }

        op
    }

    /// Copy `pattern` with its matrix mapping backend space onto pattern space, given the inverse of the
    /// transform that was current when it was set.
    fn copy_transformed_pattern(&self, pattern: &Pattern, ctm_inverse: &Matrix) -> Pattern {
        let mut pattern = pattern.clone();

        let device = pattern
            .surface()
            .filter(|surface| surface.has_device_transform())
            .map(Surface::device_transform);
        if let Some(device) = device {
            pattern.pretransform(&device);
        }

        if !ctm_inverse.is_identity() {
            pattern.transform(ctm_inverse);
        }

        if self.target.has_device_transform() {
            pattern.transform(&self.target.device_transform_inverse());
        }

        pattern
    }

    /// The source, ready to be handed to the target with `op`.
    fn source_for(&self, op: Operator) -> Pattern {
        if op == Operator::Clear {
            return Pattern::solid(Color::TRANSPARENT);
        }

        let pattern = self.copy_transformed_pattern(&self.source, &self.source_ctm_inverse);
        if self.opacity < 1.0 {
            pattern.with_opacity(self.opacity)
        } else {
            pattern
        }
    }

    pub(crate) fn paint(&self) -> Result {
        self.source.status()?;
        if self.op == Operator::Dest || self.clipped() {
            return Ok(());
        }

        let op = self.reduce_op();
        let source = self.source_for(op);
        self.target.paint(op, &source, &self.clip)
    }

    pub(crate) fn mask(&self, mask: &Pattern) -> Result {
        self.source.status()?;
        mask.status()?;
        if self.op == Operator::Dest || self.clipped() {
            return Ok(());
        }

        if mask.is_opaque(None) {
            log::trace!("opaque mask, painting instead");
            return self.paint();
        }
        if mask.is_clear() && self.op.is_bounded_by_mask() {
            return Ok(());
        }

        let op = self.reduce_op();
        let source = self.source_for(op);

        // a solid mask only scales the source
        if mask.pattern_type() == PatternType::Solid && op.is_bounded_by_source() {
            let alpha = mask.color().map_or(0.0, Color::alpha);
            let source = source.with_opacity(f64::from(alpha) * mask.opacity());
            return self.target.paint(op, &source, &self.clip);
        }

        let mask = self.copy_transformed_pattern(mask, self.ctm.inverse());
        self.target.mask(op, &source, &mask, &self.clip)
    }

    pub(crate) fn fill(&self, path: &PathFixed) -> Result {
        self.source.status()?;
        if self.op == Operator::Dest || self.clipped() {
            return Ok(());
        }

        if path.fill_is_empty() {
            if self.op.is_bounded_by_mask() {
                return Ok(());
            }
            log::trace!("empty fill under an unbounded operator, clearing");
            let clear = Pattern::solid(Color::TRANSPARENT);
            return self.target.paint(Operator::Clear, &clear, &self.clip);
        }

        let op = self.reduce_op();
        let source = self.source_for(op);

        // a box covering the whole target is a paint
        if let (Some(bx), Some(extents)) = (path.is_box(), self.target.extents()) {
            if bx.round_to_inner_rectangle().contains_rectangle(&extents) {
                log::trace!("fill covers the target, painting instead");
                return self.target.paint(op, &source, &self.clip);
            }
        }

        let options = FillOptions {
            fill_rule: self.fill_rule,
            tolerance: self.tolerance,
            antialias: self.antialias,
        };
        self.target.fill(op, &source, path, &options, &self.clip)
    }

    pub(crate) fn stroke(&self, path: &PathFixed) -> Result {
        self.source.status()?;
        if self.stroke_style.line_width <= 0.0 {
            return Ok(());
        }
        if self.op == Operator::Dest || self.clipped() {
            return Ok(());
        }

        let op = self.reduce_op();
        let source = self.source_for(op);

        let ctm = self.user_to_backend();
        let ctm_inverse = self.backend_to_user();
        let options = StrokeOptions {
            style: &self.stroke_style,
            ctm: &ctm,
            ctm_inverse: &ctm_inverse,
            tolerance: self.tolerance,
            antialias: self.antialias,
        };
        self.target.stroke(op, &source, path, &options, &self.clip)
    }

    /* Clipping */

    pub(crate) fn clip(&mut self, path: &PathFixed) {
        self.clip
            .intersect_path(path, self.fill_rule, self.tolerance, self.antialias);
    }

    #[inline]
    pub(crate) fn reset_clip(&mut self) {
        self.clip = Clip::unbounded();
    }

    /// The area the clip allows on the target, in backend space.
    fn clip_area(&self) -> Rectangle {
        let mut area = *self.clip.extents();
        if let Some(extents) = self.target.extents() {
            area.intersect(&extents);
        }
        area
    }

    /// The bounds of the clip in user space.
    pub(crate) fn clip_extents(&self) -> (f64, f64, f64, f64) {
        if self.clip.is_all_clipped() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let area = self.clip_area();
        if area.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        self.backend_to_user_box(
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.x2()),
            f64::from(area.y2()),
        )
    }

    pub(crate) fn in_clip(&self, x: f64, y: f64) -> bool {
        let (x, y) = self.user_to_backend().transform_point(x, y);
        self.clip.contains_point(x, y)
    }

    /// The clip as a list of rectangles in user space.
    pub(crate) fn clip_rectangles(&self) -> Result<Vec<RectangleF>> {
        if self.clip.is_all_clipped() {
            return Ok(Vec::new());
        }
        if self.clip.has_paths() {
            return Err(Error::ClipNotRepresentable);
        }

        let rects = if self.clip.is_unbounded() {
            match self.target.extents() {
                Some(extents) => vec![extents],
                None => return Err(Error::ClipNotRepresentable),
            }
        } else {
            let mut rects = self.clip.rectangles().ok_or(Error::ClipNotRepresentable)?;
            if let Some(extents) = self.target.extents() {
                rects.retain_mut(|r| r.intersect(&extents));
            }
            rects
        };

        // only rectangles that stay rectangles in user space can be handed back
        let to_user = self.backend_to_user();
        if to_user.xy != 0.0 || to_user.yx != 0.0 {
            return Err(Error::ClipNotRepresentable);
        }

        Ok(rects
            .into_iter()
            .map(|r| {
                let (x1, y1, x2, y2) = to_user.transform_bounding_box(
                    f64::from(r.x),
                    f64::from(r.y),
                    f64::from(r.x2()),
                    f64::from(r.y2()),
                );
                RectangleF::new(x1, y1, x2 - x1, y2 - y1)
            })
            .collect())
    }

    /* Queries */

    pub(crate) fn in_fill(&self, path: &PathFixed, x: f64, y: f64) -> bool {
        let (x, y) = self.user_to_backend().transform_point(x, y);
        path.in_fill(x, y, self.fill_rule, self.tolerance)
    }

    pub(crate) fn in_stroke(&self, path: &PathFixed, x: f64, y: f64) -> bool {
        if self.stroke_style.line_width <= 0.0 {
            return false;
        }

        let (x, y) = self.user_to_backend().transform_point(x, y);
        let ctm = self.user_to_backend();
        let ctm_inverse = self.backend_to_user();

        // cheap rejection before building the outline
        let approx = approximate_stroke_extents(path, &self.stroke_style, &ctm);
        if !(x >= f64::from(approx.x)
            && x <= f64::from(approx.x2())
            && y >= f64::from(approx.y)
            && y <= f64::from(approx.y2()))
        {
            return false;
        }

        in_stroke(
            path,
            &self.stroke_style,
            &ctm,
            &ctm_inverse,
            self.tolerance,
            x,
            y,
        )
    }

    pub(crate) fn fill_extents(&self, path: &PathFixed) -> (f64, f64, f64, f64) {
        match path.fill_extents(self.fill_rule, self.tolerance) {
            Some((x1, y1, x2, y2)) => self.backend_to_user_box(x1, y1, x2, y2),
            None => (0.0, 0.0, 0.0, 0.0),
        }
    }

    pub(crate) fn stroke_extents(&self, path: &PathFixed) -> (f64, f64, f64, f64) {
        if self.stroke_style.line_width <= 0.0 {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let ctm = self.user_to_backend();
        let ctm_inverse = self.backend_to_user();
        match stroke_extents(path, &self.stroke_style, &ctm, &ctm_inverse, self.tolerance) {
            Some((x1, y1, x2, y2)) => self.backend_to_user_box(x1, y1, x2, y2),
            None => (0.0, 0.0, 0.0, 0.0),
        }
    }
}

/// The saved levels of a context, with the current one on top.
///
/// Popped levels keep their slot in the stack's storage, so saving again at the same depth does not
/// allocate.
#[derive(Debug)]
pub(crate) struct StateStack {
    current: State,
    saved: Vec<State>,
}

impl StateStack {
    pub(crate) fn new(target: Surface) -> StateStack {
        StateStack {
            current: State::new(target),
            saved: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> &State {
        &self.current
    }

    #[inline]
    pub(crate) fn current_mut(&mut self) -> &mut State {
        &mut self.current
    }

    /// How many levels have been saved.
    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Push a copy of the current level.
    pub(crate) fn save(&mut self) -> Result {
        self.saved
            .try_reserve(1)
            .map_err(|_| Error::NoMemory)?;
        let copy = self.current.clone();
        self.saved.push(mem::replace(&mut self.current, copy));
        log::debug!("saved state, depth is now {}", self.depth());
        Ok(())
    }

    /// Go back to the last saved level.
    pub(crate) fn restore(&mut self) -> Result {
        let previous = self.saved.pop().ok_or(Error::InvalidRestore)?;
        self.current = previous;
        log::debug!("restored state, depth is now {}", self.depth());
        Ok(())
    }
}

#[cfg(all(test, feature = "image"))]
mod tests {
    use super::*;
    use crate::Format;
    use approx::assert_abs_diff_eq;

    fn target() -> Surface {
        Surface::image(Format::Argb32, 20, 20).unwrap()
    }

    #[test]
    fn restore_past_the_bottom() {
        let mut stack = StateStack::new(target());
        assert_eq!(stack.restore(), Err(Error::InvalidRestore));

        stack.save().unwrap();
        stack.current_mut().op = Operator::Xor;
        stack.current_mut().stroke_style.line_width = 7.0;
        assert_eq!(stack.depth(), 1);

        stack.restore().unwrap();
        assert_eq!(stack.current().op, Operator::Over);
        assert_abs_diff_eq!(stack.current().stroke_style.line_width, 2.0);
        assert_eq!(stack.restore(), Err(Error::InvalidRestore));
    }

    #[test]
    fn tolerance_floor() {
        let mut state = State::new(target());
        state.set_tolerance(0.0);
        assert_abs_diff_eq!(state.tolerance, 1.0 / 256.0);
        state.set_tolerance(0.5);
        assert_abs_diff_eq!(state.tolerance, 0.5);
    }

    #[test]
    fn singular_transforms_are_refused() {
        let mut state = State::new(target());
        state.transform(&Matrix::translation(5.0, 0.0)).unwrap();
        assert_eq!(
            state.transform(&Matrix::scaling(0.0, 1.0)),
            Err(Error::InvalidMatrix)
        );
        // left as it was
        assert_eq!(*state.ctm.forward(), Matrix::translation(5.0, 0.0));
    }

    #[test]
    fn source_reduction() {
        let mut state = State::new(target());
        state.op = Operator::Source;
        state.set_source(Pattern::rgba(1.0, 0.0, 0.0, 0.0));
        assert_eq!(state.reduce_op(), Operator::Clear);

        state.set_source(Pattern::rgb(0.0, 0.0, 0.0));
        assert_eq!(state.reduce_op(), Operator::Source);

        let opaque = Surface::image(Format::Rgb24, 4, 4).unwrap();
        let mut state = State::new(opaque);
        state.op = Operator::Source;
        state.set_source(Pattern::rgb(0.0, 0.0, 0.0));
        assert_eq!(state.reduce_op(), Operator::Clear);
    }

    #[test]
    fn source_is_locked_to_its_user_space() {
        let mut state = State::new(target());
        state.transform(&Matrix::translation(5.0, 5.0)).unwrap();
        state.set_source(Pattern::rgb(1.0, 0.0, 0.0));
        state.identity_matrix();

        let source = state.source_for(Operator::Over);
        assert_eq!(source.matrix().transform_point(5.0, 5.0), (0.0, 0.0));
    }

    #[test]
    fn clip_rectangles() {
        let mut state = State::new(target());
        assert_eq!(
            state.clip_rectangles().unwrap(),
            vec![RectangleF::new(0.0, 0.0, 20.0, 20.0)]
        );

        state.transform(&Matrix::translation(2.0, 0.0)).unwrap();
        state.clip.intersect_rectangle(&Rectangle::new(4, 4, 4, 4));
        assert_eq!(
            state.clip_rectangles().unwrap(),
            vec![RectangleF::new(2.0, 4.0, 4.0, 4.0)]
        );

        state.transform(&Matrix::rotation(0.5)).unwrap();
        assert_eq!(state.clip_rectangles(), Err(Error::ClipNotRepresentable));
    }
}
