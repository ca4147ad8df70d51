// MIT/Apache2 License

use ordered_float::NotNan;

/// A popular concept in easel is a range that goes from zero to one, defining intensity of a color or the
/// offset of a color stop in a gradient. This type is essentially a wrapper around an `f32`, but with two
/// invariants:
///
/// * The inner value will always be between `0.0` and `1.0`.
/// * The inner value will never be `NaN`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Intensity {
    inner: NotNan<f32>,
}

impl Intensity {
    pub const ZERO: Intensity = unsafe { Intensity::new_unchecked(0.0) };
    pub const ONE: Intensity = unsafe { Intensity::new_unchecked(1.0) };

    /// Create a new `Intensity`, without checking the inner value.
    ///
    /// # Safety
    ///
    /// Behavior is undefined if `inner` is not a number, or outside of the range [0, 1].
    #[inline]
    pub const unsafe fn new_unchecked(inner: f32) -> Self {
        Self {
            inner: unsafe { NotNan::unchecked_new(inner) },
        }
    }

    /// Create a new `Intensity`. If the inner value does not meet the invariants mentioned above, this function
    /// returns `None`.
    #[inline]
    pub fn new(inner: f32) -> Option<Self> {
        if inner.is_nan() || !(0.0..=1.0).contains(&inner) {
            None
        } else {
            Some(Self {
                inner: unsafe { NotNan::unchecked_new(inner) },
            })
        }
    }

    /// Create a new `Intensity` from a double, clamping it into range. `NaN` becomes zero.
    #[inline]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let value = value.clamp(0.0, 1.0) as f32;
            Self {
                inner: unsafe { NotNan::unchecked_new(value) },
            }
        }
    }

    /// Get the inner value of the `Intensity`.
    #[inline]
    pub fn into_inner(self) -> f32 {
        self.inner.into_inner()
    }

    /// Get the inner value as a double.
    #[inline]
    pub fn to_f64(self) -> f64 {
        f64::from(self.into_inner())
    }

    /// Clamp this value to a `u8`.
    #[inline]
    pub fn clamp_to_u8(self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = (self.into_inner() * 255.0).round() as u8;
        value
    }

    /// Clamp this value to a `u16`.
    #[inline]
    pub fn clamp_to_u16(self) -> u16 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = (self.into_inner() * 65535.0).round() as u16;
        value
    }
}

impl From<Intensity> for f32 {
    #[inline]
    fn from(i: Intensity) -> f32 {
        i.into_inner()
    }
}

impl From<Intensity> for f64 {
    #[inline]
    fn from(i: Intensity) -> f64 {
        i.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping() {
        assert_eq!(Intensity::clamped(2.0), Intensity::ONE);
        assert_eq!(Intensity::clamped(-1.0), Intensity::ZERO);
        assert_eq!(Intensity::clamped(f64::NAN), Intensity::ZERO);
        assert!(Intensity::new(1.5).is_none());
        assert_eq!(Intensity::ONE.clamp_to_u8(), 255);
        assert_eq!(Intensity::clamped(0.5).clamp_to_u16(), 32768);
    }
}
