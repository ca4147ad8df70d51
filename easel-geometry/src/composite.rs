// MIT/Apache2 License

/// Operations that can be used to composite a source onto a destination.
///
/// The first group are the Porter-Duff operators, followed by `Add` and
/// `Saturate`, then the separable and non-separable blend modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Clear,
    Source,
    Over,
    In,
    Out,
    Atop,
    Dest,
    DestOver,
    DestIn,
    DestOut,
    DestAtop,
    Xor,
    Add,
    Saturate,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
}

impl Default for Operator {
    #[inline]
    fn default() -> Operator {
        Operator::Over
    }
}

impl Operator {
    /// Whether the operator leaves the destination untouched wherever the
    /// mask has no coverage.
    #[must_use]
    pub fn is_bounded_by_mask(self) -> bool {
        !matches!(
            self,
            Operator::Source | Operator::In | Operator::Out | Operator::DestIn | Operator::DestAtop
        )
    }

    /// Whether the operator leaves the destination untouched wherever the
    /// source is transparent.
    #[must_use]
    pub fn is_bounded_by_source(self) -> bool {
        !matches!(
            self,
            Operator::Clear
                | Operator::Source
                | Operator::In
                | Operator::Out
                | Operator::DestIn
                | Operator::DestAtop
        )
    }

    /// Whether the operator is a blend mode rather than a Porter-Duff
    /// operator.
    #[inline]
    #[must_use]
    pub fn is_blend_mode(self) -> bool {
        self >= Operator::Multiply
    }
}

/// The kind of antialiasing to use when rasterising geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Antialias {
    /// Let the backend decide.
    Default,
    /// Use a bilevel mask.
    None,
    Gray,
    Subpixel,
    Fast,
    Good,
    Best,
}

impl Default for Antialias {
    #[inline]
    fn default() -> Antialias {
        Antialias::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundedness() {
        assert!(Operator::Over.is_bounded_by_mask());
        assert!(Operator::Over.is_bounded_by_source());
        assert!(!Operator::Source.is_bounded_by_mask());
        assert!(Operator::Clear.is_bounded_by_mask());
        assert!(!Operator::Clear.is_bounded_by_source());
        assert!(Operator::Screen.is_blend_mode());
        assert!(!Operator::Saturate.is_blend_mode());
    }
}
