// MIT/Apache2 License

use crate::{color::lerp_premultiplied, Error, NSOpType, Premultiplied, Result};
use easel_geometry::Operator;

/// Something that is able to run compositing operations on premultiplied
/// pixels.
///
/// Coverage is the fraction of the pixel covered by the shape being drawn.
/// Operators bounded by the mask leave the destination alone where the
/// coverage is zero; the others are applied with the source reduced by the
/// coverage, except for `Source`, which interpolates between the destination
/// and the source.
pub trait Compositor {
    /// Composite a single pixel.
    fn composite(
        &self,
        op: Operator,
        src: Premultiplied,
        dst: Premultiplied,
        coverage: f32,
    ) -> Result<Premultiplied>;

    /// Composite a run of pixels.
    ///
    /// By default, this calls `composite` once per pixel.
    fn composite_span(
        &self,
        op: Operator,
        src: &[Premultiplied],
        dst: &mut [Premultiplied],
        coverage: &[f32],
    ) -> Result {
        dst.iter_mut()
            .zip(src.iter().zip(coverage.iter()))
            .try_for_each(|(d, (&s, &c))| {
                *d = self.composite(op, s, *d, c)?;
                Ok(())
            })
    }
}

/// A compositor for the Porter-Duff operators, `Add` and `Saturate`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct BasicCompositor;

impl BasicCompositor {
    /// The fractions of the source and the destination that make up the
    /// result.
    fn factors(op: Operator, sa: f32, da: f32) -> Result<(f32, f32)> {
        Ok(match op {
            Operator::Clear => (0.0, 0.0),
            Operator::Source => (1.0, 0.0),
            Operator::Over => (1.0, 1.0 - sa),
            Operator::In => (da, 0.0),
            Operator::Out => (1.0 - da, 0.0),
            Operator::Atop => (da, 1.0 - sa),
            Operator::Dest => (0.0, 1.0),
            Operator::DestOver => (1.0 - da, 1.0),
            Operator::DestIn => (0.0, sa),
            Operator::DestOut => (0.0, 1.0 - sa),
            Operator::DestAtop => (1.0 - da, sa),
            Operator::Xor => (1.0 - da, 1.0 - sa),
            Operator::Add => (1.0, 1.0),
            Operator::Saturate => {
                let fa = if sa <= 0.0 {
                    1.0
                } else {
                    ((1.0 - da) / sa).min(1.0)
                };
                (fa, 1.0)
            }
            _ => return Err(Error::NotSupported(NSOpType::BlendModes)),
        })
    }

    fn apply(op: Operator, src: Premultiplied, dst: Premultiplied) -> Result<Premultiplied> {
        let (fa, fb) = BasicCompositor::factors(op, src[3], dst[3])?;
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = (src[i] * fa + dst[i] * fb).clamp(0.0, 1.0);
        }
        Ok(out)
    }
}

impl Compositor for BasicCompositor {
    fn composite(
        &self,
        op: Operator,
        src: Premultiplied,
        dst: Premultiplied,
        coverage: f32,
    ) -> Result<Premultiplied> {
        let coverage = coverage.clamp(0.0, 1.0);

        if op == Operator::Source || op.is_bounded_by_mask() {
            if coverage <= 0.0 {
                // still reject what we cannot do
                BasicCompositor::factors(op, 0.0, 0.0)?;
                return Ok(dst);
            }
            let full = BasicCompositor::apply(op, src, dst)?;
            Ok(if coverage >= 1.0 {
                full
            } else {
                lerp_premultiplied(dst, full, coverage)
            })
        } else {
            BasicCompositor::apply(op, src.map(|c| c * coverage), dst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RED: Premultiplied = [1.0, 0.0, 0.0, 1.0];
    const HALF_BLUE: Premultiplied = [0.0, 0.0, 0.5, 0.5];

    #[test]
    fn over() {
        let out = BasicCompositor
            .composite(Operator::Over, HALF_BLUE, RED, 1.0)
            .unwrap();
        assert_eq!(out, [0.5, 0.0, 0.5, 1.0]);

        let partial = BasicCompositor
            .composite(Operator::Over, RED, [0.0; 4], 0.25)
            .unwrap();
        assert_abs_diff_eq!(partial[0], 0.25);
        assert_abs_diff_eq!(partial[3], 0.25);
    }

    #[test]
    fn unbounded_operators_clear_outside() {
        // in clears the destination where the shape has no coverage
        let out = BasicCompositor
            .composite(Operator::In, RED, HALF_BLUE, 0.0)
            .unwrap();
        assert_eq!(out, [0.0; 4]);

        // source leaves it alone
        let out = BasicCompositor
            .composite(Operator::Source, RED, HALF_BLUE, 0.0)
            .unwrap();
        assert_eq!(out, HALF_BLUE);
    }

    #[test]
    fn add_saturates() {
        let out = BasicCompositor
            .composite(Operator::Add, RED, RED, 1.0)
            .unwrap();
        assert_eq!(out, RED);

        let out = BasicCompositor
            .composite(Operator::Saturate, HALF_BLUE, [0.0, 0.0, 0.0, 0.75], 1.0)
            .unwrap();
        assert_abs_diff_eq!(out[2], 0.25);
        assert_abs_diff_eq!(out[3], 1.0);
    }

    #[test]
    fn blend_modes_are_not_supported() {
        assert_eq!(
            BasicCompositor.composite(Operator::Multiply, RED, RED, 1.0),
            Err(Error::NotSupported(NSOpType::BlendModes))
        );
        assert_eq!(
            BasicCompositor.composite(Operator::Screen, RED, RED, 0.0),
            Err(Error::NotSupported(NSOpType::BlendModes))
        );
    }

    #[test]
    fn spans() {
        let src = [RED; 3];
        let mut dst = [[0.0; 4]; 3];
        BasicCompositor
            .composite_span(Operator::Over, &src, &mut dst, &[1.0, 0.5, 0.0])
            .unwrap();
        assert_eq!(dst[0], RED);
        assert_abs_diff_eq!(dst[1][0], 0.5);
        assert_eq!(dst[2], [0.0; 4]);
    }
}
