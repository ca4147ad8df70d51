// MIT/Apache2 License

//! Turning geometry into per-pixel coverage.

use easel_geometry::{Antialias, Clip, FillRule, FixedBox, Polygon, Rectangle};

/// The fraction of each pixel in an area that a shape covers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Coverage {
    area: Rectangle,
    values: Vec<f32>,
}

impl Coverage {
    fn with_value(area: Rectangle, value: f32) -> Coverage {
        #[allow(clippy::cast_sign_loss)]
        let len = (area.width.max(0) as usize) * (area.height.max(0) as usize);
        Coverage {
            area,
            values: vec![value; len],
        }
    }

    /// Nothing is covered.
    #[inline]
    pub(crate) fn empty(area: Rectangle) -> Coverage {
        Coverage::with_value(area, 0.0)
    }

    /// Everything is covered.
    #[inline]
    pub(crate) fn full(area: Rectangle) -> Coverage {
        Coverage::with_value(area, 1.0)
    }

    /// Set the coverage of every pixel from its coordinates.
    pub(crate) fn fill_with<F: FnMut(i32, i32) -> f32>(&mut self, mut f: F) {
        let area = self.area;
        for y in self.rows() {
            let row = self.row_mut(y);
            for (c, x) in row.iter_mut().zip(area.x..area.x2()) {
                *c = f(x, y).clamp(0.0, 1.0);
            }
        }
    }

    /// The coverage of the row at `y`, in device space.
    #[inline]
    pub(crate) fn row(&self, y: i32) -> &[f32] {
        let range = self.row_range(y);
        &self.values[range]
    }

    #[inline]
    fn row_mut(&mut self, y: i32) -> &mut [f32] {
        let range = self.row_range(y);
        &mut self.values[range]
    }

    #[allow(clippy::cast_sign_loss)]
    fn row_range(&self, y: i32) -> core::ops::Range<usize> {
        let width = self.area.width as usize;
        let start = ((y - self.area.y) as usize) * width;
        start..start + width
    }

    /// Rows of the area, top to bottom.
    #[inline]
    fn rows(&self) -> core::ops::Range<i32> {
        self.area.y..self.area.y2()
    }

    /// Rasterise `polygon` over `area`.
    pub(crate) fn from_polygon(
        area: Rectangle,
        polygon: &Polygon,
        fill_rule: FillRule,
        antialias: Antialias,
    ) -> Coverage {
        let mut coverage = Coverage::empty(area);
        if area.is_empty() || polygon.is_empty() {
            return coverage;
        }

        let samples = samples_per_pixel(antialias);
        #[allow(clippy::cast_precision_loss)]
        let weight = 1.0 / samples as f32;

        for y in coverage.rows() {
            let (left, right) = (area.x, area.x2());
            let row = coverage.row_mut(y);

            if samples == 1 {
                // bilevel: a pixel is in if its center is
                for (start, end) in polygon.spans_at(f64::from(y) + 0.5, fill_rule) {
                    let first = ((start - 0.5).ceil() as i32).max(left);
                    let last = ((end - 0.5).ceil() as i32).min(right);
                    for x in first..last {
                        row[(x - left) as usize] = 1.0;
                    }
                }
                continue;
            }

            for sample in 0..samples {
                #[allow(clippy::cast_precision_loss)]
                let sy = f64::from(y) + (sample as f64 + 0.5) / samples as f64;
                for (start, end) in polygon.spans_at(sy, fill_rule) {
                    add_span(row, left, right, start, end, weight);
                }
            }

            row.iter_mut().for_each(|c| *c = c.min(1.0));
        }

        coverage
    }

    /// The coverage of `clip` over `area`.
    pub(crate) fn from_clip(area: Rectangle, clip: &Clip, antialias: Antialias) -> Coverage {
        if clip.is_all_clipped() {
            return Coverage::empty(area);
        }

        let mut coverage = if clip.is_unbounded() {
            Coverage::full(area)
        } else if clip.boxes().is_empty() {
            let mut coverage = Coverage::empty(area);
            coverage.add_box(&FixedBox::from_rectangle(clip.extents()));
            coverage
        } else {
            let mut coverage = Coverage::empty(area);
            clip.boxes().iter().for_each(|b| coverage.add_box(b));
            coverage
        };

        for (polygon, fill_rule) in clip.get_polygons() {
            coverage.multiply(&Coverage::from_polygon(area, &polygon, fill_rule, antialias));
        }

        coverage
    }

    /// Add the exact area a box covers in each pixel.
    fn add_box(&mut self, b: &FixedBox) {
        let (x1, y1, x2, y2) = b.to_f64();
        let (left, right) = (self.area.x, self.area.x2());
        let first = (y1.floor() as i32).max(self.area.y);
        let last = (y2.ceil() as i32).min(self.area.y2());

        for y in first..last {
            let top = y1.max(f64::from(y));
            let bottom = y2.min(f64::from(y + 1));
            if bottom <= top {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let weight = (bottom - top) as f32;
            let row = self.row_mut(y);
            add_span(row, left, right, x1, x2, weight);
            row.iter_mut().for_each(|c| *c = c.min(1.0));
        }
    }

    /// Multiply by another coverage over the same area.
    pub(crate) fn multiply(&mut self, other: &Coverage) {
        debug_assert_eq!(self.area, other.area);
        self.values
            .iter_mut()
            .zip(other.values.iter())
            .for_each(|(a, b)| *a *= b);
    }

    /// Whether no pixel has any coverage.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.values.iter().all(|&c| c <= 0.0)
    }
}

/// How many rows of samples to take per pixel.
#[inline]
fn samples_per_pixel(antialias: Antialias) -> usize {
    match antialias {
        Antialias::None => 1,
        Antialias::Fast => 2,
        Antialias::Best => 16,
        _ => 4,
    }
}

/// Add the horizontal overlap of `[start, end)` with each pixel of a row,
/// scaled by `weight`.
fn add_span(row: &mut [f32], left: i32, right: i32, start: f64, end: f64, weight: f32) {
    let start = start.max(f64::from(left));
    let end = end.min(f64::from(right));
    if end <= start {
        return;
    }

    let first = start.floor() as i32;
    let last = end.ceil() as i32;
    for x in first..last {
        let overlap = end.min(f64::from(x + 1)) - start.max(f64::from(x));
        if overlap > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                row[(x - left) as usize] += overlap as f32 * weight;
            }
        }
    }
}

/// The smallest pixel rectangle around some polygon extents.
pub(crate) fn polygon_area(polygon: &Polygon) -> Option<Rectangle> {
    let (x1, y1, x2, y2) = polygon.extents()?;
    let (x1, y1) = (x1.floor() as i32, y1.floor() as i32);
    let (x2, y2) = (x2.ceil() as i32, y2.ceil() as i32);
    Some(Rectangle::new(x1, y1, x2 - x1, y2 - y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use easel_geometry::point;

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Polygon {
        let mut polygon = Polygon::new();
        polygon.add_closed([point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)]);
        polygon
    }

    #[test]
    fn aligned_square_is_exact() {
        let area = Rectangle::new(0, 0, 4, 4);
        let coverage =
            Coverage::from_polygon(area, &square(1.0, 1.0, 3.0, 3.0), FillRule::NonZero, Antialias::Default);

        assert_eq!(coverage.row(0), &[0.0; 4]);
        assert_eq!(coverage.row(1), &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(coverage.row(3), &[0.0; 4]);
    }

    #[test]
    fn half_pixels() {
        let area = Rectangle::new(0, 0, 2, 2);
        let coverage =
            Coverage::from_polygon(area, &square(0.5, 0.0, 2.0, 1.0), FillRule::NonZero, Antialias::Default);

        assert_abs_diff_eq!(coverage.row(0)[0], 0.5);
        assert_abs_diff_eq!(coverage.row(0)[1], 1.0);
        assert_eq!(coverage.row(1), &[0.0, 0.0]);
    }

    #[test]
    fn bilevel_uses_pixel_centers() {
        let area = Rectangle::new(0, 0, 3, 1);
        let coverage =
            Coverage::from_polygon(area, &square(0.4, 0.0, 1.6, 1.0), FillRule::NonZero, Antialias::None);

        assert_eq!(coverage.row(0), &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn clip_boxes() {
        let area = Rectangle::new(0, 0, 4, 4);
        let clip = Clip::from_rectangle(&Rectangle::new(1, 1, 2, 2));
        let coverage = Coverage::from_clip(area, &clip, Antialias::Default);

        assert_eq!(coverage.row(0), &[0.0; 4]);
        assert_eq!(coverage.row(2), &[0.0, 1.0, 1.0, 0.0]);
        assert!(!coverage.is_empty());

        let none = Coverage::from_clip(area, &Clip::all_clipped(), Antialias::Default);
        assert!(none.is_empty());
    }
}
