// MIT/Apache2 License

use crate::{Error, NSOpType, Pattern, PatternType, Premultiplied, Result};
use core::{
    any::Any,
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
};
use easel_geometry::{
    Antialias, Clip, FillRule, InvertibleMatrix, Matrix, Operator, PathFixed, Polygon, Rectangle,
    StrokeStyle,
};
use std::rc::Rc;

/// Default implementations of `SurfaceBackend` functions.
mod defaults;
/// Provides the `SurfaceFeatures` and `Content` types.
mod features;

pub use features::{Content, SurfaceFeatures};

/// Largest width or height a surface may have.
pub const MAX_SURFACE_SIZE: i32 = 32767;

/// How a path is filled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillOptions {
    pub fill_rule: FillRule,
    pub tolerance: f64,
    pub antialias: Antialias,
}

/// How a path is stroked. `ctm` maps user space, where the style is
/// measured, to backend space, where the path lives.
#[derive(Debug, Copy, Clone)]
pub struct StrokeOptions<'a> {
    pub style: &'a StrokeStyle,
    pub ctm: &'a Matrix,
    pub ctm_inverse: &'a Matrix,
    pub tolerance: f64,
    pub antialias: Antialias,
}

/// A copy of the pixels of a surface, premultiplied, row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub width: i32,
    pub height: i32,
    pub content: Content,
    pub pixels: Vec<Premultiplied>,
}

impl SourceImage {
    /// Get the pixel at `(x, y)`, or `None` if it lies outside of the image.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Premultiplied> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels.get(index).copied()
    }
}

/// Something that can be drawn upon; otherwise known as the whole point of this crate.
///
/// A `SurfaceBackend` owns the pixels (or commands, or whatever else it
/// records) behind a [`Surface`]. Everything it receives is already in
/// backend space: paths and clips have been transformed, and pattern matrices
/// map backend space onto pattern space.
///
/// No matter what, backends should be capable of the following:
///
/// * Returning a list of "features" that the backend implements by returning a [`SurfaceFeatures`] object
///   from the `features()` method. The surface layer refuses to pass along patterns that the backend has not
///   claimed support for.
/// * Painting a source through a clip, and masking a source with another pattern.
/// * Filling a polygon with a fill rule. `fill()` and `stroke()` are implemented in terms of
///   `fill_polygon()`; however, it is usually more efficient to reimplement them.
/// * Producing a copy of its pixels with `acquire_source_image()`, so that it can be used as a source.
pub trait SurfaceBackend: Any {
    /// Upcast for the purpose of downcasting to the concrete backend.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for the purpose of downcasting to the concrete backend.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Get an enumeration of the features that this backend is capable of.
    fn features(&self) -> SurfaceFeatures;
    /// What this backend stores for each pixel.
    fn content(&self) -> Content;
    /// The area this backend covers, or `None` if it is unbounded.
    fn extents(&self) -> Option<Rectangle>;

    /// Composite `source` everywhere within `clip`.
    fn paint(&mut self, op: Operator, source: &Pattern, clip: &Clip) -> Result;
    /// Composite `source` through the alpha of `mask`.
    fn mask(&mut self, op: Operator, source: &Pattern, mask: &Pattern, clip: &Clip) -> Result;
    /// Composite `source` through the coverage of `polygon`.
    fn fill_polygon(
        &mut self,
        op: Operator,
        source: &Pattern,
        polygon: &Polygon,
        fill_rule: FillRule,
        antialias: Antialias,
        clip: &Clip,
    ) -> Result;

    /// Composite `source` through the fill of `path`.
    #[inline]
    fn fill(
        &mut self,
        op: Operator,
        source: &Pattern,
        path: &PathFixed,
        options: &FillOptions,
        clip: &Clip,
    ) -> Result {
        defaults::fill(self, op, source, path, options, clip)
    }

    /// Composite `source` through the stroke of `path`.
    #[inline]
    fn stroke(
        &mut self,
        op: Operator,
        source: &Pattern,
        path: &PathFixed,
        options: &StrokeOptions<'_>,
        clip: &Clip,
    ) -> Result {
        defaults::stroke(self, op, source, path, options, clip)
    }

    /// Flush all drawing operations down the connection, if necessary.
    #[inline]
    fn flush(&mut self) -> Result {
        Ok(())
    }

    /// Release whatever the backend holds. Called once, after a flush.
    #[inline]
    fn finish(&mut self) -> Result {
        Ok(())
    }

    /// Create a new, cleared backend of the same kind.
    fn create_similar(
        &self,
        content: Content,
        width: i32,
        height: i32,
    ) -> Result<Box<dyn SurfaceBackend>>;

    /// Create a copy of this backend's current contents.
    fn snapshot(&self) -> Result<Box<dyn SurfaceBackend>>;

    /// Copy the pixels of this backend.
    fn acquire_source_image(&self) -> Result<SourceImage>;

    /// Give back an image obtained from `acquire_source_image`.
    #[inline]
    fn release_source_image(&self, _image: SourceImage) {}
}

/// A shared handle to something that can be drawn upon.
///
/// Cloning a `Surface` creates another handle to the same backend. The
/// handle tracks the parts of a surface's state that are independent of the
/// backend: the device transform, whether it has been finished, whether it is
/// known to be clear, and its sticky error status.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<SurfaceInner>,
}

struct SurfaceInner {
    backend: RefCell<Box<dyn SurfaceBackend>>,
    content: Content,
    features: SurfaceFeatures,
    device_transform: Cell<InvertibleMatrix>,
    finished: Cell<bool>,
    is_clear: Cell<bool>,
    status: Cell<Option<Error>>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("content", &self.inner.content)
            .field("features", &self.inner.features)
            .field("device_transform", self.inner.device_transform.get().forward())
            .field("finished", &self.inner.finished.get())
            .field("is_clear", &self.inner.is_clear.get())
            .field("status", &self.inner.status.get())
            .finish()
    }
}

impl Surface {
    /// Wrap a backend in a surface.
    #[inline]
    pub fn new<B: SurfaceBackend>(backend: B) -> Surface {
        Surface::from_boxed(Box::new(backend))
    }

    /// Wrap an already boxed backend in a surface. New surfaces are assumed
    /// to be clear.
    pub fn from_boxed(backend: Box<dyn SurfaceBackend>) -> Surface {
        let content = backend.content();
        let features = backend.features();
        Surface {
            inner: Rc::new(SurfaceInner {
                backend: RefCell::new(backend),
                content,
                features,
                device_transform: Cell::new(InvertibleMatrix::identity()),
                finished: Cell::new(false),
                is_clear: Cell::new(true),
                status: Cell::new(None),
            }),
        }
    }

    /// Create a surface backed by an in-memory image.
    #[cfg(feature = "image")]
    #[inline]
    pub fn image(format: crate::Format, width: i32, height: i32) -> Result<Surface> {
        Ok(Surface::new(crate::ImageSurface::new(format, width, height)?))
    }

    #[inline]
    pub fn content(&self) -> Content {
        self.inner.content
    }

    #[inline]
    pub fn features(&self) -> SurfaceFeatures {
        self.inner.features
    }

    /// The sticky error status of this surface.
    #[inline]
    pub fn status(&self) -> Result {
        match self.inner.status.get() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The area covered by this surface in backend space, or `None` if it is
    /// unbounded.
    #[inline]
    pub fn extents(&self) -> Option<Rectangle> {
        self.backend().ok().and_then(|backend| backend.extents())
    }

    /// Whether nothing has been drawn to this surface since it was created
    /// or last cleared.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.inner.is_clear.get()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.inner.finished.get()
    }

    /// Whether both handles refer to the same surface.
    #[inline]
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /* Device transform */

    /// The transform from device space to backend space.
    #[inline]
    pub fn device_transform(&self) -> Matrix {
        *self.inner.device_transform.get().forward()
    }

    /// The transform from backend space to device space.
    #[inline]
    pub fn device_transform_inverse(&self) -> Matrix {
        *self.inner.device_transform.get().inverse()
    }

    #[inline]
    pub fn has_device_transform(&self) -> bool {
        !self.device_transform().is_identity()
    }

    /// Set the offset added to device space coordinates.
    pub fn set_device_offset(&self, x_offset: f64, y_offset: f64) -> Result {
        self.check()?;
        let mut m = self.device_transform();
        m.x0 = x_offset;
        m.y0 = y_offset;
        self.set_device_transform(m)
    }

    #[inline]
    pub fn device_offset(&self) -> (f64, f64) {
        let m = self.device_transform();
        (m.x0, m.y0)
    }

    /// Set the scale applied to device space coordinates.
    pub fn set_device_scale(&self, x_scale: f64, y_scale: f64) -> Result {
        self.check()?;
        let mut m = self.device_transform();
        m.xx = x_scale;
        m.yy = y_scale;
        m.xy = 0.0;
        m.yx = 0.0;
        self.set_device_transform(m)
    }

    #[inline]
    pub fn device_scale(&self) -> (f64, f64) {
        let m = self.device_transform();
        (m.xx, m.yy)
    }

    fn set_device_transform(&self, m: Matrix) -> Result {
        let transform = InvertibleMatrix::new(m).ok_or(Error::InvalidMatrix)?;
        self.inner.device_transform.set(transform);
        Ok(())
    }

    /* Lifecycle */

    /// Flush any pending drawing down to the backend.
    pub fn flush(&self) -> Result {
        self.status()?;
        if self.is_finished() {
            return Ok(());
        }
        let result = self.backend_mut()?.flush();
        self.record(result)
    }

    /// Flush the surface and release the backend's resources. Drawing to a
    /// finished surface fails with `SurfaceFinished`.
    pub fn finish(&self) -> Result {
        if self.is_finished() {
            return Ok(());
        }
        self.flush()?;
        let result = self.backend_mut()?.finish();
        self.inner.finished.set(true);
        log::debug!("surface finished");
        self.record(result)
    }

    /// Create a new surface of the same kind as this one. The width and
    /// height are in device units and are scaled by the device scale.
    pub fn create_similar(&self, content: Content, width: i32, height: i32) -> Result<Surface> {
        self.check()?;
        if width < 0 || height < 0 {
            return Err(Error::InvalidSize);
        }

        let (sx, sy) = self.device_scale();
        #[allow(clippy::cast_possible_truncation)]
        let (bw, bh) = (
            (f64::from(width) * sx).ceil() as i32,
            (f64::from(height) * sy).ceil() as i32,
        );
        let backend = self.backend()?.create_similar(content, bw, bh)?;
        let similar = Surface::from_boxed(backend);
        similar.set_device_scale(sx, sy)?;
        Ok(similar)
    }

    /// Create a surface holding a copy of this one's current contents.
    pub fn snapshot(&self) -> Result<Surface> {
        self.check()?;
        let backend = self.backend()?.snapshot()?;
        let snapshot = Surface::from_boxed(backend);
        snapshot.set_device_transform(self.device_transform())?;
        snapshot.inner.is_clear.set(self.is_clear());
        Ok(snapshot)
    }

    /// Acquire a copy of this surface's pixels, run `f` on it and release
    /// it again.
    pub fn map_source_image<R, F: FnOnce(&SourceImage) -> R>(&self, f: F) -> Result<R> {
        self.status()?;
        let backend = self.backend()?;
        let image = backend.acquire_source_image()?;
        let result = f(&image);
        backend.release_source_image(image);
        Ok(result)
    }

    /// Run `f` on the backend, if it is of type `T`.
    pub fn with_backend<T: SurfaceBackend, R, F: FnOnce(&T) -> R>(&self, f: F) -> Result<R> {
        let backend = self.backend()?;
        let ours = cast_our_backend::<T>(backend.as_any()).ok_or(Error::SurfaceTypeMismatch)?;
        Ok(f(ours))
    }

    /// Run `f` on the backend mutably, if it is of type `T`. The surface is
    /// no longer considered clear afterwards.
    pub fn with_backend_mut<T: SurfaceBackend, R, F: FnOnce(&mut T) -> R>(
        &self,
        f: F,
    ) -> Result<R> {
        self.check()?;
        let mut backend = self.backend_mut()?;
        let ours = backend
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(Error::SurfaceTypeMismatch)?;
        let result = f(ours);
        self.inner.is_clear.set(false);
        Ok(result)
    }

    /* Drawing */

    /// Composite `source` onto this surface everywhere within `clip`.
    pub fn paint(&self, op: Operator, source: &Pattern, clip: &Clip) -> Result {
        self.begin_draw(op, &[source])?;
        if clip.is_all_clipped() || self.nothing_to_do(op, source) {
            return Ok(());
        }

        let source = self.detach(source)?;
        let result = self.backend_mut()?.paint(op, &source, clip);
        self.end_draw(result, op == Operator::Clear && clip.is_unbounded())
    }

    /// Composite `source` onto this surface through the alpha of `mask`.
    pub fn mask(&self, op: Operator, source: &Pattern, mask: &Pattern, clip: &Clip) -> Result {
        self.begin_draw(op, &[source, mask])?;
        if clip.is_all_clipped() || self.nothing_to_do(op, source) {
            return Ok(());
        }
        if mask.is_clear() && op.is_bounded_by_mask() {
            return Ok(());
        }

        let source = self.detach(source)?;
        let mask = self.detach(mask)?;
        let result = self.backend_mut()?.mask(op, &source, &mask, clip);
        self.end_draw(result, false)
    }

    /// Composite `source` onto this surface through the fill of `path`.
    pub fn fill(
        &self,
        op: Operator,
        source: &Pattern,
        path: &PathFixed,
        options: &FillOptions,
        clip: &Clip,
    ) -> Result {
        self.begin_draw(op, &[source])?;
        if clip.is_all_clipped() || self.nothing_to_do(op, source) {
            return Ok(());
        }

        let source = self.detach(source)?;
        let result = self.backend_mut()?.fill(op, &source, path, options, clip);
        self.end_draw(result, false)
    }

    /// Composite `source` onto this surface through the stroke of `path`.
    pub fn stroke(
        &self,
        op: Operator,
        source: &Pattern,
        path: &PathFixed,
        options: &StrokeOptions<'_>,
        clip: &Clip,
    ) -> Result {
        self.begin_draw(op, &[source])?;
        if clip.is_all_clipped() || self.nothing_to_do(op, source) {
            return Ok(());
        }

        let source = self.detach(source)?;
        let result = self.backend_mut()?.stroke(op, &source, path, options, clip);
        self.end_draw(result, false)
    }

    /* Helpers */

    fn check(&self) -> Result {
        self.status()?;
        if self.is_finished() {
            Err(Error::SurfaceFinished)
        } else {
            Ok(())
        }
    }

    fn backend(&self) -> Result<Ref<'_, Box<dyn SurfaceBackend>>> {
        // only fails when the surface is drawn to while it is being read
        self.inner
            .backend
            .try_borrow()
            .map_err(|_| Error::NullPointer)
    }

    fn backend_mut(&self) -> Result<RefMut<'_, Box<dyn SurfaceBackend>>> {
        self.inner
            .backend
            .try_borrow_mut()
            .map_err(|_| Error::NullPointer)
    }

    fn begin_draw(&self, op: Operator, patterns: &[&Pattern]) -> Result {
        self.check()?;

        if op.is_blend_mode() && !self.inner.features.blend_modes {
            return Err(Error::NotSupported(NSOpType::BlendModes));
        }

        patterns.iter().try_for_each(|pattern| {
            pattern.status()?;
            self.check_support(pattern.pattern_type())
        })
    }

    fn check_support(&self, ty: PatternType) -> Result {
        let features = &self.inner.features;
        let missing = match ty {
            PatternType::Solid => None,
            PatternType::Linear | PatternType::Radial if !features.gradients => {
                Some(NSOpType::Gradients)
            }
            PatternType::Surface if !features.surface_patterns => Some(NSOpType::SurfacePatterns),
            PatternType::Mesh if !features.mesh_patterns => Some(NSOpType::MeshPatterns),
            PatternType::RasterSource if !features.raster_sources => {
                Some(NSOpType::RasterSources)
            }
            _ => None,
        };

        match missing {
            Some(nsop) => Err(Error::NotSupported(nsop)),
            None => Ok(()),
        }
    }

    /// Whether drawing `source` with `op` cannot change this surface.
    fn nothing_to_do(&self, op: Operator, source: &Pattern) -> bool {
        let mut op = op;
        if source.is_clear() {
            if matches!(op, Operator::Over | Operator::Add) {
                log::trace!("clear source under {:?}, skipping", op);
                return true;
            }
            if op == Operator::Source {
                op = Operator::Clear;
            }
        }

        if op == Operator::Clear && self.is_clear() {
            log::trace!("clearing a clear surface, skipping");
            return true;
        }

        op == Operator::Atop && !self.inner.content.has_color()
    }

    /// Replace a pattern sourced from this surface with one sourced from a
    /// snapshot, so that the backend never reads from itself.
    fn detach(&self, pattern: &Pattern) -> Result<Pattern> {
        match pattern.surface() {
            Some(surface) if surface.ptr_eq(self) => {
                log::trace!("source is the target, snapshotting");
                Ok(pattern.with_surface(self.snapshot()?))
            }
            _ => Ok(pattern.clone()),
        }
    }

    fn end_draw(&self, result: Result, is_clear: bool) -> Result {
        if result.is_ok() {
            self.inner.is_clear.set(is_clear);
        }
        self.record(result)
    }

    /// Errors that leave the surface unusable are remembered.
    fn record(&self, result: Result) -> Result {
        if let Err(Error::NoMemory) = result {
            if self.inner.status.get().is_none() {
                log::warn!("surface entered error state: {}", Error::NoMemory);
                self.inner.status.set(Some(Error::NoMemory));
            }
        }
        result
    }
}

/// Cast a given backend to see if it is of our type.
#[inline]
pub fn cast_our_backend<T: SurfaceBackend>(backend: &dyn Any) -> Option<&T> {
    backend.downcast_ref()
}
