// MIT/Apache2 License

use crate::intensity::Intensity;

/// A four-element color, stored without premultiplication.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    r: Intensity,
    g: Intensity,
    b: Intensity,
    a: Intensity,
}

/// A color with every channel multiplied by its alpha, in `[r, g, b, a]`
/// order. This is what backends composite with.
pub type Premultiplied = [f32; 4];

impl Color {
    pub const WHITE: Color = unsafe { Color::new_unchecked(1.0, 1.0, 1.0, 1.0) };
    pub const BLACK: Color = unsafe { Color::new_unchecked(0.0, 0.0, 0.0, 1.0) };
    pub const TRANSPARENT: Color = unsafe { Color::new_unchecked(0.0, 0.0, 0.0, 0.0) };

    /// Create a new color.
    ///
    /// # Safety
    ///
    /// Behavior is undefined if any of the elements are NaN or outside of [0, 1].
    #[inline]
    pub const unsafe fn new_unchecked(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: Intensity::new_unchecked(r),
            g: Intensity::new_unchecked(g),
            b: Intensity::new_unchecked(b),
            a: Intensity::new_unchecked(a),
        }
    }

    /// Creates a new color. This function returns `None` if any of the elements are NaN or out of range.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Option<Self> {
        Some(Self {
            r: Intensity::new(r)?,
            g: Intensity::new(g)?,
            b: Intensity::new(b)?,
            a: Intensity::new(a)?,
        })
    }

    /// Create a color from doubles, clamping each channel into [0, 1].
    #[inline]
    pub fn from_rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: Intensity::clamped(r),
            g: Intensity::clamped(g),
            b: Intensity::clamped(b),
            a: Intensity::clamped(a),
        }
    }

    /// Gets the red element.
    #[inline]
    pub fn red(self) -> f32 {
        self.r.into_inner()
    }

    /// Gets the green element.
    #[inline]
    pub fn green(self) -> f32 {
        self.g.into_inner()
    }

    /// Gets the blue element.
    #[inline]
    pub fn blue(self) -> f32 {
        self.b.into_inner()
    }

    /// Gets the alpha element.
    #[inline]
    pub fn alpha(self) -> f32 {
        self.a.into_inner()
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == Intensity::ONE
    }

    #[inline]
    pub fn is_clear(self) -> bool {
        self.a == Intensity::ZERO
    }

    /// Whether the color channels are all zero, ignoring alpha.
    #[inline]
    pub fn is_black(self) -> bool {
        self.r == Intensity::ZERO && self.g == Intensity::ZERO && self.b == Intensity::ZERO
    }

    /// Scale the alpha of this color by `factor`.
    #[inline]
    pub fn with_alpha_scaled(self, factor: f64) -> Self {
        Self {
            a: Intensity::clamped(self.a.to_f64() * factor),
            ..self
        }
    }

    /// Premultiply this color.
    #[inline]
    pub fn premultiplied(self) -> Premultiplied {
        let a = self.alpha();
        [self.red() * a, self.green() * a, self.blue() * a, a]
    }

    /// Recover a color from premultiplied channels.
    #[inline]
    pub fn from_premultiplied(px: Premultiplied) -> Self {
        let a = px[3];
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        let a64 = f64::from(a);
        Self::from_rgba(
            f64::from(px[0]) / a64,
            f64::from(px[1]) / a64,
            f64::from(px[2]) / a64,
            a64,
        )
    }

    /// Clamp to u8's.
    #[inline]
    pub fn clamp_u8(self) -> (u8, u8, u8, u8) {
        let r = self.r.clamp_to_u8();
        let g = self.g.clamp_to_u8();
        let b = self.b.clamp_to_u8();
        let a = self.a.clamp_to_u8();
        (r, g, b, a)
    }

    /// Clamp to u16's.
    #[inline]
    pub fn clamp_u16(self) -> (u16, u16, u16, u16) {
        let r: u16 = self.r.clamp_to_u16();
        let g: u16 = self.g.clamp_to_u16();
        let b: u16 = self.b.clamp_to_u16();
        let a: u16 = self.a.clamp_to_u16();
        (r, g, b, a)
    }
}

/// Linearly interpolate between two premultiplied colors.
#[inline]
pub(crate) fn lerp_premultiplied(a: Premultiplied, b: Premultiplied, t: f32) -> Premultiplied {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn premultiply() {
        let c = Color::from_rgba(1.0, 0.5, 0.0, 0.5);
        let px = c.premultiplied();
        assert_abs_diff_eq!(px[0], 0.5);
        assert_abs_diff_eq!(px[1], 0.25);
        assert_abs_diff_eq!(px[3], 0.5);

        let back = Color::from_premultiplied(px);
        assert_abs_diff_eq!(back.green(), 0.5, epsilon = 1e-6);
        assert_eq!(Color::from_premultiplied([0.0; 4]), Color::TRANSPARENT);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let c = Color::from_rgba(2.0, -1.0, 0.25, 1.0);
        assert_eq!(c.clamp_u8(), (255, 0, 64, 255));
        assert!(c.is_opaque());
        assert!(!Color::BLACK.with_alpha_scaled(0.0).is_opaque());
        assert!(Color::BLACK.with_alpha_scaled(0.0).is_clear());
    }
}
