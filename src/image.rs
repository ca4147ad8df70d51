// MIT/Apache2 License

//! An in-memory raster backend.
//!
//! [`ImageSurface`] keeps its pixels in client memory, laid out row by row. It is the reference backend of this
//! crate: every pattern type and every operator other than the blend modes can be drawn onto it, and any other
//! surface can be turned into one through [`Surface::map_source_image`](crate::Surface::map_source_image).

use crate::{
    color::lerp_premultiplied,
    surface::{Content, SourceImage, SurfaceBackend, SurfaceFeatures, MAX_SURFACE_SIZE},
    BasicCompositor, Compositor, Error, Pattern, Premultiplied, Result,
};
use core::any::Any;
use easel_geometry::{Antialias, Clip, FillRule, Operator, Polygon, Rectangle};

mod raster;
use raster::Coverage;

/// The format that the pixels of an [`ImageSurface`] are stored in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    /// Every pixel is a native-endian `u32`, with alpha in the upper eight bits, followed by red, green and blue.
    /// The color channels are premultiplied by alpha.
    Argb32,
    /// Laid out the same way as `Argb32`, but the upper eight bits are ignored and every pixel is opaque.
    Rgb24,
    /// Every pixel is a single byte of alpha.
    A8,
}

impl Default for Format {
    #[inline]
    fn default() -> Format {
        Format::Argb32
    }
}

impl Format {
    /// How many bytes each pixel takes up.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Format::Argb32 | Format::Rgb24 => 4,
            Format::A8 => 1,
        }
    }

    /// The number of bytes between the starts of two rows of an image `width` pixels wide. Rows are aligned to
    /// four bytes.
    ///
    /// Returns `None` if the width is negative or too large.
    #[inline]
    pub fn stride_for_width(self, width: i32) -> Option<usize> {
        if !(0..=MAX_SURFACE_SIZE).contains(&width) {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let bytes = (width as usize) * self.bytes_per_pixel();
        Some((bytes + 3) & !3)
    }

    /// What this format stores for each pixel.
    #[inline]
    pub fn content(self) -> Content {
        match self {
            Format::Argb32 => Content::ColorAlpha,
            Format::Rgb24 => Content::Color,
            Format::A8 => Content::Alpha,
        }
    }

    /// The format best suited to store `content`.
    #[inline]
    pub fn from_content(content: Content) -> Format {
        match content {
            Content::ColorAlpha => Format::Argb32,
            Content::Color => Format::Rgb24,
            Content::Alpha => Format::A8,
        }
    }
}

/// A surface backend that keeps its pixels in memory.
///
/// # Construction
///
/// `ImageSurface`s are created with `new`, which takes the [`Format`] to store pixels in as well as the width and
/// height of the image. Widths and heights must lie between zero and [`MAX_SURFACE_SIZE`]; zero-sized images are
/// allowed and simply have nothing to draw to. New images are cleared to transparent black, or to opaque black
/// for `Rgb24`.
///
/// Most users will want to wrap the image in a [`Surface`](crate::Surface) right away, using
/// [`Surface::image`](crate::Surface::image). The pixels can still be reached afterwards through
/// [`Surface::with_backend`](crate::Surface::with_backend).
///
/// # Pixel Access
///
/// The raw bytes are available through `data` and `data_mut`, laid out as the `Format` describes with `stride`
/// bytes per row. `get_pixel` and `set_pixel` convert single pixels to and from premultiplied floating point
/// colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSurface {
    format: Format,
    width: i32,
    height: i32,
    stride: usize,
    data: Vec<u8>,
}

impl ImageSurface {
    /// Create a new, cleared image.
    pub fn new(format: Format, width: i32, height: i32) -> Result<ImageSurface> {
        if !(0..=MAX_SURFACE_SIZE).contains(&height) {
            return Err(Error::InvalidSize);
        }
        let stride = format.stride_for_width(width).ok_or(Error::InvalidSize)?;

        #[allow(clippy::cast_sign_loss)]
        let len = stride * (height as usize);
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| Error::NoMemory)?;
        data.resize(len, 0);

        log::debug!("created {}x{} {:?} image", width, height, format);

        Ok(ImageSurface {
            format,
            width,
            height,
            stride,
            data,
        })
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The number of bytes from the start of one row to the start of the next.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The area covered by this image.
    #[inline]
    fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }

    /// The byte offset of the pixel at `(x, y)`, if it is inside the image.
    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        Some((y as usize) * self.stride + (x as usize) * self.format.bytes_per_pixel())
    }

    /// Get the premultiplied color of the pixel at `(x, y)`.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Premultiplied> {
        let offset = self.offset(x, y)?;
        Some(match self.format {
            Format::A8 => [0.0, 0.0, 0.0, from_byte(self.data[offset])],
            Format::Argb32 | Format::Rgb24 => {
                let mut bytes = [0; 4];
                bytes.copy_from_slice(&self.data[offset..offset + 4]);
                let [a, r, g, b] = u32::from_ne_bytes(bytes).to_be_bytes();
                let a = if self.format == Format::Rgb24 { 1.0 } else { from_byte(a) };
                [from_byte(r), from_byte(g), from_byte(b), a]
            }
        })
    }

    /// Set the pixel at `(x, y)` to a premultiplied color. Pixels outside of the image are ignored, as are the
    /// channels the format does not store.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Premultiplied) {
        let offset = match self.offset(x, y) {
            Some(offset) => offset,
            None => return,
        };

        match self.format {
            Format::A8 => self.data[offset] = to_byte(color[3]),
            Format::Argb32 | Format::Rgb24 => {
                let a = if self.format == Format::Rgb24 {
                    0xFF
                } else {
                    to_byte(color[3])
                };
                let pixel =
                    u32::from_be_bytes([a, to_byte(color[0]), to_byte(color[1]), to_byte(color[2])]);
                self.data[offset..offset + 4].copy_from_slice(&pixel.to_ne_bytes());
            }
        }
    }

    /// Composite `source` through the coverage of `shape`, and then through the clip.
    fn composite(
        &mut self,
        op: Operator,
        source: &Pattern,
        shape: Shape<'_>,
        antialias: Antialias,
        clip: &Clip,
    ) -> Result {
        let compositor = BasicCompositor;

        let mut area = self.bounds();
        if !area.intersect(clip.extents()) {
            return Ok(());
        }

        // outside of these, the destination is left alone anyway
        if op.is_bounded_by_mask() {
            if let Shape::Polygon(polygon, _) = shape {
                match raster::polygon_area(polygon) {
                    Some(bounds) if area.intersect(&bounds) => {}
                    _ => return Ok(()),
                }
            }
        }
        if op.is_bounded_by_source() && !area.intersect(&source.get_extents(false)) {
            return Ok(());
        }

        let sampler = source.sampler()?;
        let solid = sampler.solid();

        let shape_coverage = match shape {
            Shape::Everything => Coverage::full(area),
            Shape::Polygon(polygon, fill_rule) => {
                Coverage::from_polygon(area, polygon, fill_rule, antialias)
            }
            Shape::Mask(mask) => mask_coverage(area, mask)?,
        };
        if op.is_bounded_by_mask() && shape_coverage.is_empty() {
            return Ok(());
        }
        let clip_coverage = Coverage::from_clip(area, clip, antialias);

        log::trace!("compositing {:?} over {:?}", op, area);

        #[allow(clippy::cast_sign_loss)]
        let width = area.width as usize;
        let mut src = vec![[0.0; 4]; width];
        let mut dst = vec![[0.0; 4]; width];

        for y in area.y..area.y2() {
            let clip_row = clip_coverage.row(y);
            if clip_row.iter().all(|&c| c <= 0.0) {
                continue;
            }

            for (i, x) in (area.x..area.x2()).enumerate() {
                src[i] = match solid {
                    Some(color) => color,
                    None => sampler.sample(f64::from(x) + 0.5, f64::from(y) + 0.5),
                };
                dst[i] = self.get_pixel(x, y).unwrap_or([0.0; 4]);
            }

            let before = dst.clone();
            compositor.composite_span(op, &src, &mut dst, shape_coverage.row(y))?;

            for (i, x) in (area.x..area.x2()).enumerate() {
                let c = clip_row[i];
                if c <= 0.0 {
                    continue;
                }
                let out = if c >= 1.0 {
                    dst[i]
                } else {
                    lerp_premultiplied(before[i], dst[i], c)
                };
                self.set_pixel(x, y, out);
            }
        }

        Ok(())
    }
}

/// What limits the area that a source is composited through.
#[derive(Copy, Clone)]
enum Shape<'a> {
    Everything,
    Polygon(&'a Polygon, FillRule),
    Mask(&'a Pattern),
}

/// The alpha of `mask` at every pixel center in `area`.
fn mask_coverage(area: Rectangle, mask: &Pattern) -> Result<Coverage> {
    let sampler = mask.sampler()?;
    let mut coverage = Coverage::empty(area);
    coverage.fill_with(|x, y| sampler.sample(f64::from(x) + 0.5, f64::from(y) + 0.5)[3]);
    Ok(coverage)
}

#[inline]
fn from_byte(b: u8) -> f32 {
    f32::from(b) / 255.0
}

#[inline]
fn to_byte(c: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }
}

impl SurfaceBackend for ImageSurface {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn features(&self) -> SurfaceFeatures {
        SurfaceFeatures {
            blend_modes: false,
            ..SurfaceFeatures::all()
        }
    }

    #[inline]
    fn content(&self) -> Content {
        self.format.content()
    }

    #[inline]
    fn extents(&self) -> Option<Rectangle> {
        Some(self.bounds())
    }

    #[inline]
    fn paint(&mut self, op: Operator, source: &Pattern, clip: &Clip) -> Result {
        self.composite(op, source, Shape::Everything, Antialias::Default, clip)
    }

    #[inline]
    fn mask(&mut self, op: Operator, source: &Pattern, mask: &Pattern, clip: &Clip) -> Result {
        self.composite(op, source, Shape::Mask(mask), Antialias::Default, clip)
    }

    #[inline]
    fn fill_polygon(
        &mut self,
        op: Operator,
        source: &Pattern,
        polygon: &Polygon,
        fill_rule: FillRule,
        antialias: Antialias,
        clip: &Clip,
    ) -> Result {
        self.composite(op, source, Shape::Polygon(polygon, fill_rule), antialias, clip)
    }

    fn create_similar(
        &self,
        content: Content,
        width: i32,
        height: i32,
    ) -> Result<Box<dyn SurfaceBackend>> {
        Ok(Box::new(ImageSurface::new(
            Format::from_content(content),
            width,
            height,
        )?))
    }

    #[inline]
    fn snapshot(&self) -> Result<Box<dyn SurfaceBackend>> {
        Ok(Box::new(self.clone()))
    }

    fn acquire_source_image(&self) -> Result<SourceImage> {
        let pixels = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| self.get_pixel(x, y).unwrap_or([0.0; 4]))
            .collect();

        Ok(SourceImage {
            width: self.width,
            height: self.height,
            content: self.format.content(),
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Surface};
    use easel_geometry::point;

    const RED: Premultiplied = [1.0, 0.0, 0.0, 1.0];

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Polygon {
        let mut polygon = Polygon::new();
        polygon.add_closed([point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)]);
        polygon
    }

    #[test]
    fn sizes() {
        assert_eq!(ImageSurface::new(Format::Argb32, -1, 10), Err(Error::InvalidSize));
        assert_eq!(
            ImageSurface::new(Format::A8, 10, MAX_SURFACE_SIZE + 1),
            Err(Error::InvalidSize)
        );

        let empty = ImageSurface::new(Format::Argb32, 0, 10).unwrap();
        assert!(empty.data().is_empty());

        let a8 = ImageSurface::new(Format::A8, 5, 2).unwrap();
        assert_eq!(a8.stride(), 8);
        assert_eq!(a8.data().len(), 16);
    }

    #[test]
    fn pixels() {
        let mut image = ImageSurface::new(Format::Argb32, 2, 2).unwrap();
        image.set_pixel(1, 1, RED);
        assert_eq!(image.get_pixel(1, 1), Some(RED));
        assert_eq!(image.get_pixel(0, 0), Some([0.0; 4]));
        assert_eq!(image.get_pixel(2, 0), None);

        let mut rgb = ImageSurface::new(Format::Rgb24, 1, 1).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), Some([0.0, 0.0, 0.0, 1.0]));
        rgb.set_pixel(0, 0, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(rgb.get_pixel(0, 0), Some([0.0, 1.0, 0.0, 1.0]));

        let mut a8 = ImageSurface::new(Format::A8, 1, 1).unwrap();
        a8.set_pixel(0, 0, RED);
        assert_eq!(a8.get_pixel(0, 0), Some([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn paint_through_clip() {
        let mut image = ImageSurface::new(Format::Argb32, 4, 4).unwrap();
        let clip = Clip::from_rectangle(&Rectangle::new(1, 1, 2, 2));
        image
            .paint(Operator::Over, &Pattern::solid(Color::WHITE), &clip)
            .unwrap();

        assert_eq!(image.get_pixel(0, 0), Some([0.0; 4]));
        assert_eq!(image.get_pixel(1, 1), Some([1.0; 4]));
        assert_eq!(image.get_pixel(2, 2), Some([1.0; 4]));
        assert_eq!(image.get_pixel(3, 3), Some([0.0; 4]));
    }

    #[test]
    fn fill_polygon() {
        let mut image = ImageSurface::new(Format::Argb32, 4, 4).unwrap();
        image
            .fill_polygon(
                Operator::Source,
                &Pattern::solid(Color::BLACK),
                &square(0.0, 0.0, 2.0, 4.0),
                FillRule::NonZero,
                Antialias::Default,
                &Clip::unbounded(),
            )
            .unwrap();

        assert_eq!(image.get_pixel(1, 3), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(image.get_pixel(2, 0), Some([0.0; 4]));
    }

    #[test]
    fn unbounded_operators_reach_the_whole_clip() {
        let mut image = ImageSurface::new(Format::Argb32, 4, 1).unwrap();
        (0..4).for_each(|x| image.set_pixel(x, 0, RED));

        image
            .fill_polygon(
                Operator::In,
                &Pattern::solid(Color::WHITE),
                &square(0.0, 0.0, 1.0, 1.0),
                FillRule::NonZero,
                Antialias::Default,
                &Clip::from_rectangle(&Rectangle::new(0, 0, 3, 1)),
            )
            .unwrap();

        assert_eq!(image.get_pixel(0, 0), Some([1.0; 4]));
        // cleared outside of the shape, but only inside of the clip
        assert_eq!(image.get_pixel(1, 0), Some([0.0; 4]));
        assert_eq!(image.get_pixel(3, 0), Some(RED));
    }

    #[test]
    fn mask_uses_alpha() {
        let mut image = ImageSurface::new(Format::Argb32, 1, 1).unwrap();
        image
            .mask(
                Operator::Over,
                &Pattern::solid(Color::WHITE),
                &Pattern::rgba(0.0, 0.0, 0.0, 0.4),
                &Clip::unbounded(),
            )
            .unwrap();

        let [r, _, _, a] = image.get_pixel(0, 0).unwrap();
        assert_eq!(to_byte(r), to_byte(0.4));
        assert_eq!(to_byte(a), to_byte(0.4));
    }

    #[test]
    fn similar_and_snapshot() {
        let surface = Surface::image(Format::Argb32, 3, 3).unwrap();
        let similar = surface.create_similar(Content::Alpha, 2, 2).unwrap();
        similar
            .with_backend(|image: &ImageSurface| {
                assert_eq!(image.format(), Format::A8);
                assert_eq!(image.width(), 2);
            })
            .unwrap();

        let image = surface.map_source_image(SourceImage::clone).unwrap();
        assert_eq!(image.pixels.len(), 9);
    }
}
