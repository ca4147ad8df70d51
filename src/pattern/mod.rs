// MIT/Apache2 License

//! Patterns: what drawing operations paint with.

use crate::{Color, ColorStop, Content, Error, Gradient, Intensity, Result, Surface};
use core::fmt;
use easel_geometry::{Matrix, Rectangle};
use std::rc::Rc;

/// Extents, filtering and opacity analysis.
mod analysis;
/// Mesh patch construction.
mod mesh;
/// Evaluating patterns at device space points.
mod sample;

pub use mesh::{Mesh, MeshPatch};
pub use sample::Sampler;

/// What kind of pattern a [`Pattern`] is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PatternType {
    Solid,
    Surface,
    Linear,
    Radial,
    Mesh,
    RasterSource,
}

/// What a pattern shows outside of its natural area.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Extend {
    /// Nothing is drawn outside.
    None,
    /// The pattern is tiled.
    Repeat,
    /// The pattern is tiled, every other copy mirrored.
    Reflect,
    /// The closest edge is extended outwards.
    Pad,
}

/// How image based patterns are resampled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Fast,
    Good,
    Best,
    Nearest,
    Bilinear,
    Gaussian,
}

impl Default for Filter {
    #[inline]
    fn default() -> Filter {
        Filter::Good
    }
}

/// A circle used as one end of a radial gradient.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// A callback that produces pixels on demand.
pub trait RasterSource {
    /// Produce a surface covering `extents`, in pattern space.
    fn acquire(&self, extents: &Rectangle) -> Result<Surface>;

    /// Give back a surface obtained from `acquire`.
    #[inline]
    fn release(&self, _surface: Surface) {}
}

#[derive(Clone)]
pub(crate) struct RasterSourceData {
    pub(crate) source: Rc<dyn RasterSource>,
    pub(crate) content: Content,
    pub(crate) extents: Rectangle,
}

impl fmt::Debug for RasterSourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSourceData")
            .field("content", &self.content)
            .field("extents", &self.extents)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PatternKind {
    Solid(Color),
    Surface(Surface),
    Linear {
        p1: (f64, f64),
        p2: (f64, f64),
        gradient: Gradient,
    },
    Radial {
        c1: Circle,
        c2: Circle,
        gradient: Gradient,
    },
    Mesh(Mesh),
    RasterSource(RasterSourceData),
}

#[derive(Debug, Clone)]
struct PatternInner {
    kind: PatternKind,
    /// Maps user space (or backend space, once transformed for drawing)
    /// onto pattern space.
    matrix: Matrix,
    extend: Extend,
    filter: Filter,
    opacity: f64,
    status: Option<Error>,
}

/// A shared, copy-on-write handle to a source of color.
///
/// Cloning a pattern is cheap; modifying a clone copies the underlying data
/// first if anything else still refers to it.
#[derive(Debug, Clone)]
pub struct Pattern {
    inner: Rc<PatternInner>,
}

impl Default for Pattern {
    #[inline]
    fn default() -> Pattern {
        Pattern::solid(Color::BLACK)
    }
}

impl Pattern {
    fn from_kind(kind: PatternKind, extend: Extend) -> Pattern {
        Pattern {
            inner: Rc::new(PatternInner {
                kind,
                matrix: Matrix::identity(),
                extend,
                filter: Filter::default(),
                opacity: 1.0,
                status: None,
            }),
        }
    }

    /// A pattern of a single color.
    #[inline]
    pub fn solid(color: Color) -> Pattern {
        Pattern::from_kind(PatternKind::Solid(color), Extend::Pad)
    }

    /// An opaque solid pattern. Channels are clamped into [0, 1].
    #[inline]
    pub fn rgb(red: f64, green: f64, blue: f64) -> Pattern {
        Pattern::rgba(red, green, blue, 1.0)
    }

    /// A solid pattern. Channels are clamped into [0, 1].
    #[inline]
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Pattern {
        Pattern::solid(Color::from_rgba(red, green, blue, alpha))
    }

    /// A pattern that shows the contents of `surface`.
    #[inline]
    pub fn for_surface(surface: &Surface) -> Pattern {
        Pattern::from_kind(PatternKind::Surface(surface.clone()), Extend::None)
    }

    /// A gradient along the line from `(x0, y0)` to `(x1, y1)`.
    #[inline]
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Pattern {
        Pattern::from_kind(
            PatternKind::Linear {
                p1: (x0, y0),
                p2: (x1, y1),
                gradient: Gradient::new(),
            },
            Extend::Pad,
        )
    }

    /// A gradient between two circles. Negative radii are treated as zero.
    #[inline]
    pub fn radial(cx0: f64, cy0: f64, radius0: f64, cx1: f64, cy1: f64, radius1: f64) -> Pattern {
        Pattern::from_kind(
            PatternKind::Radial {
                c1: Circle {
                    x: cx0,
                    y: cy0,
                    radius: radius0.max(0.0),
                },
                c2: Circle {
                    x: cx1,
                    y: cy1,
                    radius: radius1.max(0.0),
                },
                gradient: Gradient::new(),
            },
            Extend::Pad,
        )
    }

    /// An empty mesh gradient. Patches are added with `begin_patch()`.
    #[inline]
    pub fn mesh() -> Pattern {
        Pattern::from_kind(PatternKind::Mesh(Mesh::default()), Extend::Pad)
    }

    /// A pattern whose pixels are produced by `source` when it is drawn.
    pub fn raster_source(
        source: Rc<dyn RasterSource>,
        content: Content,
        width: i32,
        height: i32,
    ) -> Pattern {
        Pattern::from_kind(
            PatternKind::RasterSource(RasterSourceData {
                source,
                content,
                extents: Rectangle::new(0, 0, width.max(0), height.max(0)),
            }),
            Extend::None,
        )
    }

    fn make_mut(&mut self) -> &mut PatternInner {
        Rc::make_mut(&mut self.inner)
    }

    /// Put the pattern into an error state, if it is not in one already, and
    /// return the error it is in.
    fn set_error(&mut self, err: Error) -> Error {
        match self.inner.status {
            Some(existing) => existing,
            None => {
                log::warn!("pattern entered error state: {}", err);
                self.make_mut().status = Some(err);
                err
            }
        }
    }

    /* Accessors */

    #[inline]
    pub fn pattern_type(&self) -> PatternType {
        match self.inner.kind {
            PatternKind::Solid(_) => PatternType::Solid,
            PatternKind::Surface(_) => PatternType::Surface,
            PatternKind::Linear { .. } => PatternType::Linear,
            PatternKind::Radial { .. } => PatternType::Radial,
            PatternKind::Mesh(_) => PatternType::Mesh,
            PatternKind::RasterSource(_) => PatternType::RasterSource,
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> &PatternKind {
        &self.inner.kind
    }

    /// The sticky error status of this pattern.
    #[inline]
    pub fn status(&self) -> Result {
        match self.inner.status {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The color of a solid pattern.
    #[inline]
    pub fn color(&self) -> Option<Color> {
        match self.inner.kind {
            PatternKind::Solid(color) => Some(color),
            _ => None,
        }
    }

    /// The surface behind a surface pattern.
    #[inline]
    pub fn surface(&self) -> Option<&Surface> {
        match self.inner.kind {
            PatternKind::Surface(ref surface) => Some(surface),
            _ => None,
        }
    }

    /// A copy of this surface pattern showing `surface` instead. Other
    /// patterns are returned unchanged.
    pub fn with_surface(&self, surface: Surface) -> Pattern {
        let mut pattern = self.clone();
        if let PatternKind::Surface(ref mut s) = pattern.make_mut().kind {
            *s = surface;
        }
        pattern
    }

    /// The endpoints of a linear gradient.
    pub fn linear_points(&self) -> Result<(f64, f64, f64, f64)> {
        self.status()?;
        match self.inner.kind {
            PatternKind::Linear { p1, p2, .. } => Ok((p1.0, p1.1, p2.0, p2.1)),
            _ => Err(Error::PatternTypeMismatch),
        }
    }

    /// The circles of a radial gradient.
    pub fn radial_circles(&self) -> Result<(Circle, Circle)> {
        self.status()?;
        match self.inner.kind {
            PatternKind::Radial { c1, c2, .. } => Ok((c1, c2)),
            _ => Err(Error::PatternTypeMismatch),
        }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix {
        &self.inner.matrix
    }

    /// Set the matrix mapping user space onto pattern space. It must be
    /// invertible.
    pub fn set_matrix(&mut self, matrix: &Matrix) -> Result {
        self.status()?;
        if !matrix.is_invertible() {
            return Err(self.set_error(Error::InvalidMatrix));
        }
        self.make_mut().matrix = *matrix;
        Ok(())
    }

    #[inline]
    pub fn extend(&self) -> Extend {
        self.inner.extend
    }

    #[inline]
    pub fn set_extend(&mut self, extend: Extend) {
        if self.inner.extend != extend {
            self.make_mut().extend = extend;
        }
    }

    #[inline]
    pub fn filter(&self) -> Filter {
        self.inner.filter
    }

    #[inline]
    pub fn set_filter(&mut self, filter: Filter) {
        if self.inner.filter != filter {
            self.make_mut().filter = filter;
        }
    }

    #[inline]
    pub fn opacity(&self) -> f64 {
        self.inner.opacity
    }

    /// A copy of this pattern with its opacity multiplied by `opacity`.
    pub fn with_opacity(&self, opacity: f64) -> Pattern {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };

        let mut pattern = self.clone();
        if opacity < 1.0 {
            pattern.make_mut().opacity *= opacity;
        }
        pattern
    }

    /// Make the pattern read its input through `matrix` first, so that it
    /// can be drawn in the space `matrix` maps from.
    pub fn transform(&mut self, matrix: &Matrix) {
        let inner = self.make_mut();
        inner.matrix = matrix.then(&inner.matrix);
    }

    /// Apply `matrix` to the output of the pattern's matrix.
    pub fn pretransform(&mut self, matrix: &Matrix) {
        let inner = self.make_mut();
        inner.matrix = inner.matrix.then(matrix);
    }

    /* Color stops */

    fn gradient(&self) -> Result<&Gradient> {
        self.status()?;
        match self.inner.kind {
            PatternKind::Linear { ref gradient, .. } | PatternKind::Radial { ref gradient, .. } => {
                Ok(gradient)
            }
            _ => Err(Error::PatternTypeMismatch),
        }
    }

    /// Add an opaque color stop to a gradient.
    #[inline]
    pub fn add_color_stop_rgb(&mut self, offset: f64, red: f64, green: f64, blue: f64) -> Result {
        self.add_color_stop_rgba(offset, red, green, blue, 1.0)
    }

    /// Add a color stop to a gradient. The offset and the channels are
    /// clamped into [0, 1].
    pub fn add_color_stop_rgba(
        &mut self,
        offset: f64,
        red: f64,
        green: f64,
        blue: f64,
        alpha: f64,
    ) -> Result {
        let check = self.gradient().map(|_| ());
        if let Err(err) = check {
            return Err(self.set_error(err));
        }

        let stop = ColorStop {
            color: Color::from_rgba(red, green, blue, alpha),
            intensity: Intensity::clamped(offset),
        };
        if let PatternKind::Linear {
            ref mut gradient, ..
        }
        | PatternKind::Radial {
            ref mut gradient, ..
        } = self.make_mut().kind
        {
            gradient.add_stop(stop);
        }
        Ok(())
    }

    /// The number of color stops in a gradient.
    #[inline]
    pub fn color_stop_count(&self) -> Result<usize> {
        Ok(self.gradient()?.len())
    }

    /// The offset and color of the color stop at `index`.
    pub fn color_stop(&self, index: usize) -> Result<(f64, Color)> {
        let stop = self
            .gradient()?
            .stops()
            .get(index)
            .ok_or(Error::InvalidIndex)?;
        Ok((stop.intensity.to_f64(), stop.color))
    }

    /* Mesh construction */

    fn mesh_op<R, F: FnOnce(&mut Mesh) -> Result<R>>(&mut self, f: F) -> Result<R> {
        self.status()?;
        if self.pattern_type() != PatternType::Mesh {
            return Err(self.set_error(Error::PatternTypeMismatch));
        }

        let result = match self.make_mut().kind {
            PatternKind::Mesh(ref mut mesh) => f(mesh),
            _ => Err(Error::PatternTypeMismatch),
        };
        result.map_err(|err| self.set_error(err))
    }

    fn mesh_ref(&self) -> Result<&Mesh> {
        self.status()?;
        match self.inner.kind {
            PatternKind::Mesh(ref mesh) => Ok(mesh),
            _ => Err(Error::PatternTypeMismatch),
        }
    }

    /// Start a new patch of a mesh gradient.
    #[inline]
    pub fn begin_patch(&mut self) -> Result {
        self.mesh_op(Mesh::begin_patch)
    }

    /// Finish the current patch, closing its outline if needed.
    #[inline]
    pub fn end_patch(&mut self) -> Result {
        self.mesh_op(Mesh::end_patch)
    }

    /// Set the first point of the current patch.
    #[inline]
    pub fn move_to(&mut self, x: f64, y: f64) -> Result {
        self.mesh_op(|mesh| mesh.move_to(x, y))
    }

    /// Add a straight side to the current patch.
    #[inline]
    pub fn line_to(&mut self, x: f64, y: f64) -> Result {
        self.mesh_op(|mesh| mesh.line_to(x, y))
    }

    /// Add a curved side to the current patch.
    #[inline]
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Result {
        self.mesh_op(|mesh| mesh.curve_to((x1, y1), (x2, y2), (x3, y3)))
    }

    /// Set one of the four interior control points of the current patch.
    #[inline]
    pub fn set_control_point(&mut self, point: usize, x: f64, y: f64) -> Result {
        self.mesh_op(|mesh| mesh.set_control_point(point, x, y))
    }

    /// Set the color of one of the four corners of the current patch.
    #[inline]
    pub fn set_corner_color_rgb(&mut self, corner: usize, red: f64, green: f64, blue: f64) -> Result {
        self.set_corner_color_rgba(corner, red, green, blue, 1.0)
    }

    /// Set the color of one of the four corners of the current patch.
    #[inline]
    pub fn set_corner_color_rgba(
        &mut self,
        corner: usize,
        red: f64,
        green: f64,
        blue: f64,
        alpha: f64,
    ) -> Result {
        let color = Color::from_rgba(red, green, blue, alpha);
        self.mesh_op(|mesh| mesh.set_corner_color(corner, color))
    }

    /// The number of finished patches in a mesh gradient.
    #[inline]
    pub fn patch_count(&self) -> Result<usize> {
        Ok(self.mesh_ref()?.patches().len())
    }

    /// The finished patch at `index`.
    pub fn patch(&self, index: usize) -> Result<MeshPatch> {
        self.mesh_ref()?
            .patches()
            .get(index)
            .copied()
            .ok_or(Error::InvalidIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_on_write() {
        let mut a = Pattern::linear(0.0, 0.0, 10.0, 0.0);
        a.add_color_stop_rgb(0.0, 1.0, 0.0, 0.0).unwrap();
        let b = a.clone();
        a.add_color_stop_rgb(1.0, 0.0, 0.0, 1.0).unwrap();

        assert_eq!(a.color_stop_count(), Ok(2));
        assert_eq!(b.color_stop_count(), Ok(1));
    }

    #[test]
    fn mesh_patches_are_counted() {
        let mut mesh = Pattern::mesh();
        assert_eq!(mesh.patch_count(), Ok(0));

        mesh.begin_patch().unwrap();
        mesh.move_to(0.0, 0.0).unwrap();
        mesh.line_to(10.0, 0.0).unwrap();
        mesh.line_to(10.0, 10.0).unwrap();
        mesh.line_to(0.0, 10.0).unwrap();
        mesh.set_corner_color_rgb(0, 1.0, 0.0, 0.0).unwrap();
        mesh.end_patch().unwrap();

        assert_eq!(mesh.patch_count(), Ok(1));
        assert!(mesh.patch(0).is_ok());
        assert_eq!(mesh.patch(1).err(), Some(Error::InvalidIndex));
        assert_eq!(
            Pattern::rgb(0.0, 0.0, 0.0).patch_count(),
            Err(Error::PatternTypeMismatch)
        );
    }

    #[test]
    fn type_mismatch_is_sticky() {
        let mut p = Pattern::rgb(1.0, 0.0, 0.0);
        assert_eq!(
            p.add_color_stop_rgb(0.0, 0.0, 0.0, 0.0),
            Err(Error::PatternTypeMismatch)
        );
        assert_eq!(p.status(), Err(Error::PatternTypeMismatch));
        assert_eq!(p.set_matrix(&Matrix::identity()), Err(Error::PatternTypeMismatch));
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let mut p = Pattern::linear(0.0, 0.0, 1.0, 1.0);
        assert_eq!(p.set_matrix(&Matrix::scaling(0.0, 1.0)), Err(Error::InvalidMatrix));
        assert_eq!(p.color_stop_count(), Err(Error::InvalidMatrix));
    }

    #[test]
    fn color_stop_queries() {
        let mut p = Pattern::radial(0.0, 0.0, 0.0, 0.0, 0.0, 10.0);
        p.add_color_stop_rgba(0.5, 0.0, 1.0, 0.0, 0.5).unwrap();
        let (offset, color) = p.color_stop(0).unwrap();
        assert_eq!(offset, 0.5);
        assert_eq!(color, Color::from_rgba(0.0, 1.0, 0.0, 0.5));
        assert_eq!(p.color_stop(1), Err(Error::InvalidIndex));
    }

    #[test]
    fn transforms_compose() {
        let mut p = Pattern::rgb(0.0, 0.0, 0.0);
        p.set_matrix(&Matrix::translation(5.0, 0.0)).unwrap();
        p.transform(&Matrix::scaling(2.0, 2.0));
        assert_eq!(p.matrix().transform_point(1.0, 1.0), (7.0, 2.0));
        p.pretransform(&Matrix::scaling(0.5, 0.5));
        assert_eq!(p.matrix().transform_point(1.0, 1.0), (3.5, 1.0));
    }

    #[test]
    fn opacity_multiplies() {
        let p = Pattern::rgb(0.0, 0.0, 0.0).with_opacity(0.5).with_opacity(0.5);
        assert_eq!(p.opacity(), 0.25);
    }
}
