// MIT/Apache2 License

use super::{Circle, Extend, Filter, MeshPatch, Pattern, PatternKind};
use crate::{color::lerp_premultiplied, Gradient, Premultiplied, Result, SourceImage};
use easel_geometry::Matrix;

const CLEAR: Premultiplied = [0.0; 4];

/// Newton iterations used to find where a point lies within a mesh patch.
const MESH_ITERATIONS: usize = 16;

/// A pattern prepared for evaluation at many points.
///
/// Preparing a sampler copies whatever pixels the pattern needs out of its
/// surface, so sampling never touches another surface.
#[derive(Debug, Clone)]
pub struct Sampler {
    source: Source,
    matrix: Matrix,
    extend: Extend,
    opacity: f32,
}

#[derive(Debug, Clone)]
enum Source {
    Solid(Premultiplied),
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
    Image {
        image: SourceImage,
        nearest: bool,
    },
    Mesh(Vec<MeshPatch>),
}

impl Pattern {
    /// Prepare this pattern for sampling. The pattern's matrix must map the
    /// coordinates that will be sampled onto pattern space.
    pub fn sampler(&self) -> Result<Sampler> {
        self.status()?;

        let nearest = matches!(self.analyze_filter().0, Filter::Nearest | Filter::Fast);
        let source = match self.kind() {
            PatternKind::Solid(color) => Source::Solid(color.premultiplied()),
            PatternKind::Linear { p1, p2, gradient } => Source::Linear {
                p1: *p1,
                p2: *p2,
                gradient: gradient.clone(),
            },
            PatternKind::Radial { c1, c2, gradient } => Source::Radial {
                c1: *c1,
                c2: *c2,
                gradient: gradient.clone(),
            },
            PatternKind::Surface(surface) => Source::Image {
                image: surface.map_source_image(SourceImage::clone)?,
                nearest,
            },
            PatternKind::RasterSource(raster) => {
                let surface = raster.source.acquire(&raster.extents)?;
                let image = surface.map_source_image(SourceImage::clone);
                raster.source.release(surface);
                Source::Image {
                    image: image?,
                    nearest,
                }
            }
            PatternKind::Mesh(mesh) => Source::Mesh(mesh.patches().to_vec()),
        };

        #[allow(clippy::cast_possible_truncation)]
        let opacity = self.opacity() as f32;

        Ok(Sampler {
            source,
            matrix: *self.matrix(),
            extend: self.extend(),
            opacity,
        })
    }

    /// Evaluate this pattern at a single point.
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> Result<Premultiplied> {
        Ok(self.sampler()?.sample(x, y))
    }
}

impl Sampler {
    /// The color this sampler produces everywhere, if it is a solid color.
    #[inline]
    pub fn solid(&self) -> Option<Premultiplied> {
        match self.source {
            Source::Solid(color) => Some(scale(color, self.opacity)),
            _ => None,
        }
    }

    /// Evaluate the pattern at `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> Premultiplied {
        if let Source::Solid(color) = self.source {
            return scale(color, self.opacity);
        }

        let (u, v) = self.matrix.transform_point(x, y);
        let color = match self.source {
            Source::Solid(color) => color,
            Source::Linear {
                p1,
                p2,
                ref gradient,
            } => {
                let (dx, dy) = (p2.0 - p1.0, p2.1 - p1.1);
                let len2 = dx * dx + dy * dy;
                if len2 == 0.0 {
                    CLEAR
                } else {
                    let t = ((u - p1.0) * dx + (v - p1.1) * dy) / len2;
                    self.gradient_at(gradient, t)
                }
            }
            Source::Radial {
                ref c1,
                ref c2,
                ref gradient,
            } => match radial_parameter(c1, c2, u, v) {
                Some(t) => self.gradient_at(gradient, t),
                None => CLEAR,
            },
            Source::Image { ref image, nearest } => {
                if nearest {
                    fetch(image, u.floor(), v.floor(), self.extend)
                } else {
                    bilinear(image, u, v, self.extend)
                }
            }
            Source::Mesh(ref patches) => patches
                .iter()
                .rev()
                .find_map(|patch| mesh_color(patch, u, v))
                .unwrap_or(CLEAR),
        };

        scale(color, self.opacity)
    }

    fn gradient_at(&self, gradient: &Gradient, t: f64) -> Premultiplied {
        match extend_parameter(t, self.extend) {
            Some(t) => gradient.color_at(t),
            None => CLEAR,
        }
    }
}

#[inline]
fn scale(color: Premultiplied, factor: f32) -> Premultiplied {
    if factor >= 1.0 {
        color
    } else {
        color.map(|c| c * factor)
    }
}

/// Apply an extend mode to a gradient parameter.
fn extend_parameter(t: f64, extend: Extend) -> Option<f64> {
    if !t.is_finite() {
        return None;
    }

    match extend {
        Extend::None => (0.0..=1.0).contains(&t).then(|| t),
        Extend::Repeat => Some(t - t.floor()),
        Extend::Reflect => {
            let t = t.rem_euclid(2.0);
            Some(if t > 1.0 { 2.0 - t } else { t })
        }
        Extend::Pad => Some(t.clamp(0.0, 1.0)),
    }
}

/// Find the gradient parameter of the largest circle passing through
/// `(x, y)` that has a non-negative radius.
fn radial_parameter(c1: &Circle, c2: &Circle, x: f64, y: f64) -> Option<f64> {
    let (cdx, cdy) = (c2.x - c1.x, c2.y - c1.y);
    let dr = c2.radius - c1.radius;
    let (pdx, pdy) = (x - c1.x, y - c1.y);

    // the circle at t passes through p when a t^2 - 2 b t + c = 0
    let a = cdx * cdx + cdy * cdy - dr * dr;
    let b = pdx * cdx + pdy * cdy + c1.radius * dr;
    let c = pdx * pdx + pdy * pdy - c1.radius * c1.radius;
    let valid = |t: f64| c1.radius + t * dr >= 0.0;

    if a.abs() < f64::EPSILON {
        if b.abs() < f64::EPSILON {
            return None;
        }
        let t = c / (2.0 * b);
        return valid(t).then(|| t);
    }

    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }

    let root = disc.sqrt();
    let (t1, t2) = ((b + root) / a, (b - root) / a);
    let (hi, lo) = if t1 > t2 { (t1, t2) } else { (t2, t1) };
    if valid(hi) {
        Some(hi)
    } else if valid(lo) {
        Some(lo)
    } else {
        None
    }
}

/// Wrap an integer coordinate into `[0, size)` according to `extend`.
fn wrap(p: i64, size: i64, extend: Extend) -> Option<i64> {
    match extend {
        Extend::None => (0..size).contains(&p).then(|| p),
        Extend::Repeat => Some(p.rem_euclid(size)),
        Extend::Reflect => {
            let p = p.rem_euclid(2 * size);
            Some(if p >= size { 2 * size - 1 - p } else { p })
        }
        Extend::Pad => Some(p.clamp(0, size - 1)),
    }
}

fn fetch(image: &SourceImage, x: f64, y: f64, extend: Extend) -> Premultiplied {
    let (w, h) = (i64::from(image.width), i64::from(image.height));
    if w <= 0 || h <= 0 || !x.is_finite() || !y.is_finite() {
        return CLEAR;
    }

    #[allow(clippy::cast_possible_truncation)]
    let (x, y) = (x as i64, y as i64);
    match (wrap(x, w, extend), wrap(y, h, extend)) {
        #[allow(clippy::cast_possible_truncation)]
        (Some(x), Some(y)) => image.pixel(x as i32, y as i32).unwrap_or(CLEAR),
        _ => CLEAR,
    }
}

fn bilinear(image: &SourceImage, u: f64, v: f64, extend: Extend) -> Premultiplied {
    // pixel centers lie on half-integers
    let (fu, fv) = (u - 0.5, v - 0.5);
    let (x0, y0) = (fu.floor(), fv.floor());
    #[allow(clippy::cast_possible_truncation)]
    let (tx, ty) = ((fu - x0) as f32, (fv - y0) as f32);

    let top = lerp_premultiplied(
        fetch(image, x0, y0, extend),
        fetch(image, x0 + 1.0, y0, extend),
        tx,
    );
    let bottom = lerp_premultiplied(
        fetch(image, x0, y0 + 1.0, extend),
        fetch(image, x0 + 1.0, y0 + 1.0, extend),
        tx,
    );
    lerp_premultiplied(top, bottom, ty)
}

/// The color of `patch` at `(x, y)`, treating the patch as the bilinear
/// quad between its corners.
fn mesh_color(patch: &MeshPatch, x: f64, y: f64) -> Option<Premultiplied> {
    let q = [
        patch.corner(0),
        patch.corner(1),
        patch.corner(2),
        patch.corner(3),
    ];
    let eval = |s: f64, t: f64| {
        let w = [(1.0 - s) * (1.0 - t), s * (1.0 - t), s * t, (1.0 - s) * t];
        (
            w[0] * q[0].0 + w[1] * q[1].0 + w[2] * q[2].0 + w[3] * q[3].0,
            w[0] * q[0].1 + w[1] * q[1].1 + w[2] * q[2].1 + w[3] * q[3].1,
        )
    };

    let (mut s, mut t) = (0.5, 0.5);
    for _ in 0..MESH_ITERATIONS {
        let (px, py) = eval(s, t);
        let (ex, ey) = (px - x, py - y);

        let ds = (
            (1.0 - t) * (q[1].0 - q[0].0) + t * (q[2].0 - q[3].0),
            (1.0 - t) * (q[1].1 - q[0].1) + t * (q[2].1 - q[3].1),
        );
        let dt = (
            (1.0 - s) * (q[3].0 - q[0].0) + s * (q[2].0 - q[1].0),
            (1.0 - s) * (q[3].1 - q[0].1) + s * (q[2].1 - q[1].1),
        );
        let det = ds.0 * dt.1 - ds.1 * dt.0;
        if det.abs() < 1e-12 {
            return None;
        }

        s -= (ex * dt.1 - ey * dt.0) / det;
        t -= (ds.0 * ey - ds.1 * ex) / det;
    }

    let (px, py) = eval(s, t);
    let inside = |p: f64| (-1e-9..=1.0 + 1e-9).contains(&p);
    if (px - x).abs() > 1e-6 || (py - y).abs() > 1e-6 || !inside(s) || !inside(t) {
        return None;
    }

    let c = patch.colors.map(crate::Color::premultiplied);
    #[allow(clippy::cast_possible_truncation)]
    let (s, t) = (s as f32, t as f32);
    Some(lerp_premultiplied(
        lerp_premultiplied(c[0], c[1], s),
        lerp_premultiplied(c[3], c[2], s),
        t,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Format, ImageSurface, Surface};
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_gradient_samples() {
        let mut p = Pattern::linear(0.0, 0.0, 100.0, 0.0);
        p.add_color_stop_rgb(0.0, 0.0, 0.0, 0.0).unwrap();
        p.add_color_stop_rgb(1.0, 1.0, 1.0, 1.0).unwrap();

        let sampler = p.sampler().unwrap();
        assert_abs_diff_eq!(sampler.sample(50.0, 7.0)[0], 0.5, epsilon = 1e-6);
        // padded past the end
        assert_abs_diff_eq!(sampler.sample(150.0, 0.0)[0], 1.0);

        p.set_extend(Extend::None);
        assert_eq!(p.sample(150.0, 0.0).unwrap(), CLEAR);
        p.set_extend(Extend::Reflect);
        assert_abs_diff_eq!(p.sample(175.0, 0.0).unwrap()[0], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn radial_gradient_samples() {
        let mut p = Pattern::radial(0.0, 0.0, 0.0, 0.0, 0.0, 10.0);
        p.add_color_stop_rgb(0.0, 1.0, 1.0, 1.0).unwrap();
        p.add_color_stop_rgb(1.0, 0.0, 0.0, 0.0).unwrap();

        assert_abs_diff_eq!(p.sample(0.0, 5.0).unwrap()[1], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(p.sample(3.0, 4.0).unwrap()[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn image_samples_with_extend() {
        let surface = Surface::image(Format::Argb32, 2, 1).unwrap();
        surface
            .with_backend_mut(|img: &mut ImageSurface| {
                img.set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]);
                img.set_pixel(1, 0, [0.0, 0.0, 1.0, 1.0]);
            })
            .unwrap();

        let mut p = Pattern::for_surface(&surface);
        p.set_filter(Filter::Nearest);
        assert_eq!(p.sample(0.5, 0.5).unwrap(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(p.sample(2.5, 0.5).unwrap(), CLEAR);

        p.set_extend(Extend::Repeat);
        assert_eq!(p.sample(2.5, 0.5).unwrap(), [1.0, 0.0, 0.0, 1.0]);
        p.set_extend(Extend::Reflect);
        assert_eq!(p.sample(2.5, 0.5).unwrap(), [0.0, 0.0, 1.0, 1.0]);
        p.set_extend(Extend::Pad);
        assert_eq!(p.sample(-3.0, 0.5).unwrap(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn mesh_interpolates_corners() {
        let mut p = Pattern::mesh();
        p.begin_patch().unwrap();
        p.move_to(0.0, 0.0).unwrap();
        p.line_to(10.0, 0.0).unwrap();
        p.line_to(10.0, 10.0).unwrap();
        p.line_to(0.0, 10.0).unwrap();
        p.set_corner_color_rgb(0, 1.0, 0.0, 0.0).unwrap();
        p.set_corner_color_rgb(1, 1.0, 0.0, 0.0).unwrap();
        p.set_corner_color_rgb(2, 0.0, 0.0, 0.0).unwrap();
        p.set_corner_color_rgb(3, 0.0, 0.0, 0.0).unwrap();
        p.end_patch().unwrap();

        let center = p.sample(5.0, 5.0).unwrap();
        assert_abs_diff_eq!(center[0], 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(center[3], 1.0, epsilon = 1e-4);
        assert_eq!(p.sample(20.0, 20.0).unwrap(), CLEAR);
    }

    #[test]
    fn opacity_scales_samples() {
        let p = Pattern::rgb(1.0, 1.0, 1.0).with_opacity(0.5);
        assert_eq!(p.sample(0.0, 0.0).unwrap(), [0.5; 4]);
    }
}
