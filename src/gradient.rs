// MIT/Apache2 License

use crate::{
    color::{lerp_premultiplied, Color, Premultiplied},
    intensity::Intensity,
};
use tinyvec::TinyVec;

/// The color stops of a gradient, kept sorted by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gradient {
    stops: TinyVec<[ColorStop; 3]>,
}

/// A color stop in a color gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorStop {
    pub color: Color,
    /// Where along the gradient this stop lies.
    pub intensity: Intensity,
}

impl Gradient {
    #[inline]
    pub fn new() -> Gradient {
        Gradient::default()
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Add a stop. A stop at the same offset as existing ones goes after
    /// them, so that equal offsets produce a hard edge in insertion order.
    pub fn add_stop(&mut self, stop: ColorStop) {
        let index = self
            .stops
            .iter()
            .position(|s| s.intensity > stop.intensity)
            .unwrap_or(self.stops.len());
        self.stops.insert(index, stop);
    }

    /// Whether every stop has the same color.
    pub fn is_single_color(&self) -> Option<Color> {
        let first = self.stops.first()?.color;
        if self.stops.iter().all(|s| s.color == first) {
            Some(first)
        } else {
            None
        }
    }

    /// Whether the first and last stops share an offset.
    pub fn has_zero_span(&self) -> bool {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => first.intensity == last.intensity,
            _ => true,
        }
    }

    /// Get the premultiplied color at parameter `t`, which must already be
    /// in the range [0, 1].
    pub fn color_at(&self, t: f64) -> Premultiplied {
        let stops = &self.stops;
        let (first, last) = match (stops.first(), stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0; 4],
        };

        if t <= first.intensity.to_f64() {
            return first.color.premultiplied();
        }
        if t >= last.intensity.to_f64() {
            return last.color.premultiplied();
        }

        for pair in stops.windows(2) {
            let (lo, hi) = (pair[0].intensity.to_f64(), pair[1].intensity.to_f64());
            if t >= lo && t < hi {
                #[allow(clippy::cast_possible_truncation)]
                let frac = ((t - lo) / (hi - lo)) as f32;
                return lerp_premultiplied(
                    pair[0].color.premultiplied(),
                    pair[1].color.premultiplied(),
                    frac,
                );
            }
        }

        last.color.premultiplied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn stop(offset: f64, color: Color) -> ColorStop {
        ColorStop {
            color,
            intensity: Intensity::clamped(offset),
        }
    }

    #[test]
    fn stops_stay_sorted() {
        let mut g = Gradient::new();
        g.add_stop(stop(1.0, Color::WHITE));
        g.add_stop(stop(0.0, Color::BLACK));
        g.add_stop(stop(0.5, Color::WHITE));
        g.add_stop(stop(0.5, Color::BLACK));

        let offsets: Vec<f64> = g.stops().iter().map(|s| s.intensity.to_f64()).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 0.5, 1.0]);
        assert_eq!(g.stops()[1].color, Color::WHITE);
        assert_eq!(g.stops()[2].color, Color::BLACK);
    }

    #[test]
    fn interpolation() {
        let mut g = Gradient::new();
        g.add_stop(stop(0.0, Color::BLACK));
        g.add_stop(stop(1.0, Color::WHITE));

        let mid = g.color_at(0.5);
        assert_abs_diff_eq!(mid[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(mid[3], 1.0);
        assert_eq!(g.color_at(-1.0), Color::BLACK.premultiplied());
        assert!(g.is_single_color().is_none());
        assert!(Gradient::new().has_zero_span());
    }
}
