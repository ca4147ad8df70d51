// MIT/Apache2 License

use super::{Circle, Extend, Filter, Pattern, PatternKind};
use crate::{Color, Gradient};
use easel_geometry::{Matrix, Rectangle};

/// Scale factors within this range count as close enough to one for `Good`
/// filtering to be done bilinearly.
const GOOD_SCALE_MIN: f64 = 0.75;
const GOOD_SCALE_MAX: f64 = 1.3334;

enum Bounds {
    Empty,
    Unbounded,
    Box(f64, f64, f64, f64),
}

fn linear_is_degenerate(p1: (f64, f64), p2: (f64, f64)) -> bool {
    (p1.0 - p2.0).abs() < f64::EPSILON && (p1.1 - p2.1).abs() < f64::EPSILON
}

fn radial_is_degenerate(c1: &Circle, c2: &Circle) -> bool {
    // the circles coincide, or both have no area
    (c1.radius - c2.radius).abs() < f64::EPSILON
        && ((c1.x - c2.x).abs() < f64::EPSILON && (c1.y - c2.y).abs() < f64::EPSILON
            || c1.radius.min(c2.radius) < f64::EPSILON)
}

/// The range of the gradient parameter over the box `(x1, y1, x2, y2)`,
/// after mapping it into pattern space with `matrix`.
fn linear_box_to_parameter(
    matrix: &Matrix,
    p1: (f64, f64),
    p2: (f64, f64),
    bx: (f64, f64, f64, f64),
) -> (f64, f64) {
    let (dx, dy) = (p2.0 - p1.0, p2.1 - p1.1);
    let len2 = dx * dx + dy * dy;

    [(bx.0, bx.1), (bx.2, bx.1), (bx.0, bx.3), (bx.2, bx.3)]
        .iter()
        .map(|&(x, y)| {
            let (px, py) = matrix.transform_point(x, y);
            ((px - p1.0) * dx + (py - p1.1) * dy) / len2
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        })
}

fn rectangle_box(rect: &Rectangle) -> (f64, f64, f64, f64) {
    (
        f64::from(rect.x),
        f64::from(rect.y),
        f64::from(rect.x2()),
        f64::from(rect.y2()),
    )
}

impl Pattern {
    /// Decide which filter is actually needed to draw this pattern, and how
    /// far (in pattern space pixels) the filter reaches beyond a sample.
    pub fn analyze_filter(&self) -> (Filter, f64) {
        let matrix = self.matrix();
        match self.filter() {
            filter @ (Filter::Good | Filter::Best | Filter::Bilinear | Filter::Fast) => {
                if matrix.is_pixel_exact() {
                    // source pixels map 1:1 onto destination pixels
                    return (Filter::Nearest, 0.0);
                }

                match filter {
                    Filter::Good => {
                        let (sx, sy) = matrix.scale_factors();
                        let close = |s: f64| (GOOD_SCALE_MIN..=GOOD_SCALE_MAX).contains(&s);
                        if close(sx) && close(sy) {
                            (Filter::Bilinear, 0.5)
                        } else {
                            (Filter::Good, 0.5)
                        }
                    }
                    Filter::Best => (Filter::Best, 1.5),
                    Filter::Fast => (Filter::Fast, 0.0),
                    _ => (Filter::Bilinear, 0.5),
                }
            }
            Filter::Gaussian => (Filter::Gaussian, 1.5),
            Filter::Nearest => (Filter::Nearest, 0.0),
        }
    }

    /// The area this pattern can draw to, in the space its matrix maps from.
    ///
    /// For vector targets the filter does not enlarge the area, since no
    /// resampling happens.
    pub fn get_extents(&self, is_vector: bool) -> Rectangle {
        let mut pad = 0.0;
        let bounds = match self.kind() {
            PatternKind::Solid(_) => Bounds::Unbounded,
            PatternKind::Surface(surface) => {
                if self.extend() != Extend::None {
                    Bounds::Unbounded
                } else {
                    match surface.extents() {
                        None => Bounds::Unbounded,
                        Some(extents) if extents.is_empty() => Bounds::Empty,
                        Some(extents) => {
                            pad = self.analyze_filter().1;
                            let (x1, y1, x2, y2) = rectangle_box(&extents);
                            Bounds::Box(x1, y1, x2, y2)
                        }
                    }
                }
            }
            PatternKind::RasterSource(raster) => {
                if self.extend() != Extend::None {
                    Bounds::Unbounded
                } else if raster.extents.is_empty() {
                    Bounds::Empty
                } else {
                    pad = self.analyze_filter().1;
                    let (x1, y1, x2, y2) = rectangle_box(&raster.extents);
                    Bounds::Box(x1, y1, x2, y2)
                }
            }
            PatternKind::Radial { c1, c2, .. } => {
                if self.extend() != Extend::None {
                    Bounds::Unbounded
                } else if radial_is_degenerate(c1, c2) || (c1.radius == 0.0 && c2.radius == 0.0)
                {
                    Bounds::Empty
                } else {
                    Bounds::Box(
                        (c1.x - c1.radius).min(c2.x - c2.radius),
                        (c1.y - c1.radius).min(c2.y - c2.radius),
                        (c1.x + c1.radius).max(c2.x + c2.radius),
                        (c1.y + c1.radius).max(c2.y + c2.radius),
                    )
                }
            }
            PatternKind::Linear { p1, p2, .. } => {
                let m = self.matrix();
                if self.extend() != Extend::None {
                    Bounds::Unbounded
                } else if linear_is_degenerate(*p1, *p2) {
                    Bounds::Empty
                } else if m.xy != 0.0 || m.yx != 0.0 {
                    Bounds::Unbounded
                } else if p1.0 == p2.0 {
                    // bounded only along the axis of the gradient
                    pad = 0.5;
                    Bounds::Box(
                        f64::NEG_INFINITY,
                        p1.1.min(p2.1),
                        f64::INFINITY,
                        p1.1.max(p2.1),
                    )
                } else if p1.1 == p2.1 {
                    pad = 0.5;
                    Bounds::Box(
                        p1.0.min(p2.0),
                        f64::NEG_INFINITY,
                        p1.0.max(p2.0),
                        f64::INFINITY,
                    )
                } else {
                    Bounds::Unbounded
                }
            }
            PatternKind::Mesh(mesh) => {
                if mesh.patches().is_empty() {
                    Bounds::Empty
                } else {
                    let (x1, y1, x2, y2) = mesh.patches().iter().map(|p| p.bounds()).fold(
                        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                        |a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)),
                    );
                    pad = 0.5;
                    Bounds::Box(x1, y1, x2, y2)
                }
            }
        };

        let (mut x1, mut y1, mut x2, mut y2) = match bounds {
            Bounds::Empty => return Rectangle::default(),
            Bounds::Unbounded => return Rectangle::unbounded(),
            Bounds::Box(x1, y1, x2, y2) => (x1, y1, x2, y2),
        };

        // back out of pattern space
        let matrix = self.matrix();
        if matrix.is_translation() {
            x1 -= matrix.x0;
            x2 -= matrix.x0;
            y1 -= matrix.y0;
            y2 -= matrix.y0;
        } else {
            let inverse = match matrix.invert() {
                Some(inverse) => inverse,
                None => return Rectangle::unbounded(),
            };

            if inverse.xy == 0.0 && inverse.yx == 0.0 {
                // map each axis on its own so that infinite sides stay
                // infinite
                let (a, c) = (inverse.xx * x1 + inverse.x0, inverse.xx * x2 + inverse.x0);
                let (b, d) = (inverse.yy * y1 + inverse.y0, inverse.yy * y2 + inverse.y0);
                x1 = a.min(c);
                x2 = a.max(c);
                y1 = b.min(d);
                y2 = b.max(d);
            } else {
                let (a, b, c, d) = inverse.transform_bounding_box(x1, y1, x2, y2);
                x1 = a;
                y1 = b;
                x2 = c;
                y2 = d;
            }
        }

        if !is_vector {
            x1 -= pad;
            y1 -= pad;
            x2 += pad;
            y2 += pad;
        }

        round_out(x1, y1, x2, y2)
    }

    /// Whether drawing this pattern cannot change anything.
    pub fn is_clear(&self) -> bool {
        if self.opacity() <= 0.0 {
            return true;
        }

        match self.kind() {
            PatternKind::Solid(color) => color.is_clear(),
            PatternKind::Surface(surface) => {
                if matches!(surface.extents(), Some(e) if e.is_empty()) {
                    return true;
                }
                surface.is_clear() && surface.content().has_alpha()
            }
            PatternKind::RasterSource(raster) => raster.extents.is_empty(),
            PatternKind::Linear { p1, p2, gradient } => {
                gradient_is_clear(gradient, self.extend())
                    || (self.extend() == Extend::None && linear_is_degenerate(*p1, *p2))
            }
            PatternKind::Radial { c1, c2, gradient } => {
                gradient_is_clear(gradient, self.extend())
                    || (self.extend() == Extend::None && radial_is_degenerate(c1, c2))
            }
            PatternKind::Mesh(mesh) => mesh
                .patches()
                .iter()
                .all(|patch| patch.colors.iter().all(|c| c.is_clear())),
        }
    }

    /// Whether this pattern is a solid, fully opaque color.
    #[inline]
    pub fn is_opaque_solid(&self) -> bool {
        matches!(self.kind(), PatternKind::Solid(color) if color.is_opaque()) && self.opacity() >= 1.0
    }

    /// Whether this pattern covers every pixel of `sample` (in the space its
    /// matrix maps from) with an opaque color. Without a sample, only
    /// patterns that are opaque everywhere qualify.
    pub fn is_opaque(&self, sample: Option<&Rectangle>) -> bool {
        if self.opacity() < 1.0 {
            return false;
        }

        match self.kind() {
            PatternKind::Solid(color) => color.is_opaque(),
            PatternKind::Surface(surface) => {
                if surface.content().has_alpha() {
                    return false;
                }
                if self.extend() != Extend::None {
                    return true;
                }
                let extents = match surface.extents() {
                    Some(extents) => extents,
                    None => return true,
                };
                match sample {
                    // the sample must lie within the surface once mapped
                    // into pattern space
                    Some(sample) => {
                        let (x1, y1, x2, y2) = rectangle_box(sample);
                        let (a, b, c, d) = self.matrix().transform_bounding_box(x1, y1, x2, y2);
                        extents.contains_rectangle(&round_out(a, b, c, d))
                    }
                    None => false,
                }
            }
            PatternKind::RasterSource(raster) => {
                if raster.content.has_alpha() {
                    return false;
                }
                if self.extend() != Extend::None {
                    return true;
                }
                match sample {
                    Some(sample) => {
                        let (x1, y1, x2, y2) = rectangle_box(sample);
                        let (a, b, c, d) = self.matrix().transform_bounding_box(x1, y1, x2, y2);
                        raster.extents.contains_rectangle(&round_out(a, b, c, d))
                    }
                    None => false,
                }
            }
            PatternKind::Linear { p1, p2, gradient } => {
                if gradient.is_empty()
                    || (self.extend() == Extend::None && gradient.has_zero_span())
                {
                    return false;
                }
                if self.extend() == Extend::None {
                    let sample = match sample {
                        Some(sample) => sample,
                        None => return false,
                    };
                    if linear_is_degenerate(*p1, *p2) {
                        return false;
                    }
                    let (t0, t1) =
                        linear_box_to_parameter(self.matrix(), *p1, *p2, rectangle_box(sample));
                    if t0 < 0.0 || t1 > 1.0 {
                        return false;
                    }
                }
                gradient.stops().iter().all(|s| s.color.is_opaque())
            }
            PatternKind::Radial { gradient, .. } => {
                // radial gradients leave the outside of their cone empty
                if self.extend() == Extend::None || gradient.is_empty() {
                    return false;
                }
                gradient.stops().iter().all(|s| s.color.is_opaque())
            }
            PatternKind::Mesh(_) => false,
        }
    }

    /// If this gradient draws a single color over `sample` (in the space its
    /// matrix maps from), return that color.
    pub fn gradient_is_solid(&self, sample: Option<&Rectangle>) -> Option<Color> {
        let gradient = match self.kind() {
            PatternKind::Linear { p1, p2, gradient } => {
                if self.extend() == Extend::None && !linear_is_degenerate(*p1, *p2) {
                    // part of the sample may fall outside of the gradient
                    let (t0, t1) =
                        linear_box_to_parameter(self.matrix(), *p1, *p2, rectangle_box(sample?));
                    if t0 < 0.0 || t1 > 1.0 {
                        return None;
                    }
                }
                gradient
            }
            _ => return None,
        };

        gradient.is_single_color()
    }
}

fn gradient_is_clear(gradient: &Gradient, extend: Extend) -> bool {
    if gradient.is_empty() || (extend == Extend::None && gradient.has_zero_span()) {
        return true;
    }
    gradient.stops().iter().all(|s| s.color.is_clear())
}

/// Round a box outwards onto the integer grid, clamping to the unbounded
/// rectangle.
fn round_out(x1: f64, y1: f64, x2: f64, y2: f64) -> Rectangle {
    let limits = Rectangle::unbounded();
    let (min_x, min_y, max_x, max_y) = (limits.x, limits.y, limits.x2(), limits.y2());

    #[allow(clippy::cast_possible_truncation)]
    let clamp = |v: f64, lo: i32, hi: i32| -> i32 {
        if v.is_nan() || v <= f64::from(lo) {
            lo
        } else if v >= f64::from(hi) {
            hi
        } else {
            v as i32
        }
    };

    let ix1 = clamp(x1.floor(), min_x, max_x);
    let iy1 = clamp(y1.floor(), min_y, max_y);
    let ix2 = clamp(x2.ceil(), min_x, max_x);
    let iy2 = clamp(y2.ceil(), min_y, max_y);

    Rectangle::new(ix1, iy1, (ix2 - ix1).max(0), (iy2 - iy1).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Format, Surface};

    #[test]
    fn solid_is_unbounded() {
        assert!(Pattern::rgb(1.0, 0.0, 0.0).get_extents(false).is_unbounded());
    }

    #[test]
    fn empty_surface_is_clear() {
        let surface = Surface::image(Format::Argb32, 0, 10).unwrap();
        let pattern = Pattern::for_surface(&surface);
        assert!(pattern.is_clear());
        assert!(pattern.get_extents(false).is_empty());
    }

    #[test]
    fn surface_extents_grow_with_filter() {
        let surface = Surface::image(Format::Argb32, 10, 10).unwrap();
        let mut pattern = Pattern::for_surface(&surface);
        let mut m = Matrix::scaling(0.5, 0.5);
        m.x0 = 0.25;
        pattern.set_matrix(&m).unwrap();

        pattern.set_filter(Filter::Nearest);
        let nearest = pattern.get_extents(false);
        pattern.set_filter(Filter::Bilinear);
        let bilinear = pattern.get_extents(false);
        pattern.set_filter(Filter::Best);
        let best = pattern.get_extents(false);

        assert!(bilinear.contains_rectangle(&nearest));
        assert!(best.contains_rectangle(&bilinear));
        assert!(bilinear.width - nearest.width <= 2);
        assert!(best.width - nearest.width <= 4);
        // vector targets are not padded
        assert_eq!(pattern.get_extents(true), nearest);
    }

    #[test]
    fn pixel_exact_filters_collapse() {
        let mut pattern = Pattern::rgb(0.0, 0.0, 0.0);
        pattern.set_filter(Filter::Best);
        assert_eq!(pattern.analyze_filter(), (Filter::Nearest, 0.0));

        pattern.set_matrix(&Matrix::scaling(1.1, 1.1)).unwrap();
        pattern.set_filter(Filter::Good);
        assert_eq!(pattern.analyze_filter().0, Filter::Bilinear);
        pattern.set_matrix(&Matrix::scaling(3.0, 3.0)).unwrap();
        assert_eq!(pattern.analyze_filter().0, Filter::Good);
    }

    #[test]
    fn gradient_opacity_within_range() {
        let mut p = Pattern::linear(0.0, 0.0, 100.0, 0.0);
        p.set_extend(Extend::None);
        p.add_color_stop_rgb(0.0, 1.0, 0.0, 0.0).unwrap();
        p.add_color_stop_rgb(1.0, 0.0, 0.0, 1.0).unwrap();

        let inside = Rectangle::new(10, 0, 50, 20);
        let outside = Rectangle::new(-10, 0, 50, 20);
        assert!(p.is_opaque(Some(&inside)));
        assert!(!p.is_opaque(Some(&outside)));
        assert!(!p.is_opaque(None));
        assert!(p.gradient_is_solid(Some(&inside)).is_none());
    }

    #[test]
    fn single_colored_gradient_is_solid() {
        let mut p = Pattern::linear(0.0, 0.0, 100.0, 0.0);
        p.add_color_stop_rgb(0.0, 0.0, 1.0, 0.0).unwrap();
        p.add_color_stop_rgb(1.0, 0.0, 1.0, 0.0).unwrap();
        assert_eq!(
            p.gradient_is_solid(None),
            Some(Color::from_rgba(0.0, 1.0, 0.0, 1.0))
        );
        assert!(Pattern::radial(0.0, 0.0, 1.0, 0.0, 0.0, 2.0)
            .gradient_is_solid(None)
            .is_none());
    }

    #[test]
    fn horizontal_linear_extents() {
        let mut p = Pattern::linear(10.0, 5.0, 30.0, 5.0);
        p.set_extend(Extend::None);
        p.add_color_stop_rgb(0.0, 0.0, 0.0, 0.0).unwrap();
        let e = p.get_extents(true);
        assert_eq!((e.x, e.width), (10, 20));
        assert!(e.height > 1_000_000);
    }
}
