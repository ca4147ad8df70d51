// MIT/Apache2 License

use super::{FillOptions, StrokeOptions, SurfaceBackend};
use crate::{Pattern, Result};
use easel_geometry::{stroke_to_polygon, Clip, FillRule, FixedBox, Operator, PathFixed, Polygon};

/// A polygon limited to the area the clip could possibly let through.
fn clip_limited_polygon(clip: &Clip) -> Polygon {
    if !clip.boxes().is_empty() {
        Polygon::with_limits(clip.boxes())
    } else if clip.is_unbounded() {
        Polygon::new()
    } else {
        Polygon::with_limits(&[FixedBox::from_rectangle(clip.extents())])
    }
}

#[inline]
pub(crate) fn fill<S: SurfaceBackend + ?Sized>(
    s: &mut S,
    op: Operator,
    source: &Pattern,
    path: &PathFixed,
    options: &FillOptions,
    clip: &Clip,
) -> Result {
    let mut polygon = clip_limited_polygon(clip);
    path.fill_to_polygon(options.tolerance, &mut polygon);
    s.fill_polygon(
        op,
        source,
        &polygon,
        options.fill_rule,
        options.antialias,
        clip,
    )
}

#[inline]
pub(crate) fn stroke<S: SurfaceBackend + ?Sized>(
    s: &mut S,
    op: Operator,
    source: &Pattern,
    path: &PathFixed,
    options: &StrokeOptions<'_>,
    clip: &Clip,
) -> Result {
    let mut polygon = clip_limited_polygon(clip);
    stroke_to_polygon(
        path,
        options.style,
        options.ctm,
        options.ctm_inverse,
        options.tolerance,
        &mut polygon,
    );
    // the stroker emits positively wound pieces that may overlap
    s.fill_polygon(
        op,
        source,
        &polygon,
        FillRule::NonZero,
        options.antialias,
        clip,
    )
}
