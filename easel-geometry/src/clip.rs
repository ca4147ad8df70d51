// MIT/Apache2 License

//! The clip: where drawing is allowed to happen.

use crate::{
    boxes_extents, Antialias, FillRule, Fixed, FixedBox, FixedPoint, Matrix, PathFixed, Polygon,
    Rectangle, Region,
};
use alloc::{rc::Rc, vec::Vec};
use core::cell::OnceCell;
use tinyvec::TinyVec;

/// Tolerance used when boxes have to be turned back into paths.
const CLIP_BOX_TOLERANCE: f64 = 0.1;

/// One filled path that the clip is intersected with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub path: PathFixed,
    pub fill_rule: FillRule,
    pub tolerance: f64,
    pub antialias: Antialias,
}

/// The area that drawing is restricted to, in backend space.
///
/// The clip is the intersection of its integer extents, its boxes (if it has
/// any) and the fill of every path in its chain. Cloning a clip shares the
/// path chain and the cached region, and copies the boxes.
#[derive(Debug, Clone)]
pub struct Clip {
    extents: Rectangle,
    boxes: TinyVec<[FixedBox; 1]>,
    /// Paths, oldest first.
    paths: Option<Rc<Vec<ClipPath>>>,
    region: OnceCell<Rc<Region>>,
    is_region: bool,
    clip_all: bool,
}

impl Default for Clip {
    fn default() -> Clip {
        Clip::unbounded()
    }
}

impl PartialEq for Clip {
    fn eq(&self, other: &Clip) -> bool {
        self.equal(other)
    }
}

impl Clip {
    /// A clip that allows drawing anywhere.
    #[must_use]
    pub fn unbounded() -> Clip {
        Clip {
            extents: Rectangle::unbounded(),
            boxes: TinyVec::new(),
            paths: None,
            region: OnceCell::new(),
            is_region: true,
            clip_all: false,
        }
    }

    /// A clip that allows no drawing at all.
    #[must_use]
    pub fn all_clipped() -> Clip {
        let mut clip = Clip::unbounded();
        clip.set_all_clipped();
        clip
    }

    #[must_use]
    pub fn from_rectangle(rect: &Rectangle) -> Clip {
        let mut clip = Clip::unbounded();
        clip.intersect_rectangle(rect);
        clip
    }

    #[must_use]
    pub fn from_boxes(boxes: &[FixedBox]) -> Clip {
        let mut clip = Clip::unbounded();
        clip.intersect_boxes(boxes);
        clip
    }

    #[inline]
    #[must_use]
    pub fn is_all_clipped(&self) -> bool {
        self.clip_all
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        !self.clip_all
            && self.boxes.is_empty()
            && self.paths.is_none()
            && self.extents.is_unbounded()
    }

    /// The integer bounds of the clip.
    #[inline]
    #[must_use]
    pub fn extents(&self) -> &Rectangle {
        &self.extents
    }

    #[inline]
    #[must_use]
    pub fn boxes(&self) -> &[FixedBox] {
        &self.boxes
    }

    /// Whether the clip can be represented exactly as a pixel region.
    #[inline]
    #[must_use]
    pub fn is_region(&self) -> bool {
        self.is_region
    }

    /// Iterate over the path chain, most recent first.
    pub fn paths(&self) -> impl Iterator<Item = &ClipPath> + '_ {
        self.paths.iter().flat_map(|paths| paths.iter().rev())
    }

    #[inline]
    #[must_use]
    pub fn has_paths(&self) -> bool {
        self.paths.is_some()
    }

    fn set_all_clipped(&mut self) {
        log::debug!("clip degenerated to nothing");
        self.clip_all = true;
        self.extents = Rectangle::default();
        self.boxes.clear();
        self.paths = None;
        self.region = OnceCell::new();
        self.is_region = false;
    }

    fn invalidate_region(&mut self) {
        self.region = OnceCell::new();
        self.is_region = self.paths.is_none() && self.boxes.iter().all(FixedBox::is_pixel_aligned);
    }

    /// Restrict the clip to an integer rectangle.
    pub fn intersect_rectangle(&mut self, rect: &Rectangle) {
        if self.clip_all {
            return;
        }
        if rect.is_empty() {
            self.set_all_clipped();
            return;
        }
        if rect.is_unbounded() {
            return;
        }

        self.intersect_box(&FixedBox::from_rectangle(rect));
    }

    /// Restrict the clip to a box.
    pub fn intersect_box(&mut self, bx: &FixedBox) {
        if self.clip_all {
            return;
        }
        if bx.is_empty() {
            self.set_all_clipped();
            return;
        }

        let rect = bx.round_to_rectangle();

        if self.boxes.is_empty() {
            self.boxes.push(*bx);
            if self.paths.is_none() {
                self.extents = rect;
            } else if !self.extents.intersect(&rect) {
                self.set_all_clipped();
                return;
            } else {
                self.clip_boxes_to_extents();
            }
            self.invalidate_region();
            return;
        }

        // a single box already inside the new one is left as it is
        if self.boxes.len() == 1 && bx.contains_box(&self.boxes[0]) {
            return;
        }

        let mut changed = false;
        let mut kept: TinyVec<[FixedBox; 1]> = TinyVec::new();
        for old in self.boxes.iter() {
            let mut clipped = *old;
            let keep = clipped.intersect(bx);
            changed |= clipped != *old;
            if keep {
                kept.push(clipped);
            }
        }
        self.boxes = kept;

        if self.boxes.is_empty() {
            self.set_all_clipped();
            return;
        }
        if !changed {
            return;
        }

        self.recompute_extents();
    }

    /// Set the extents to the bounds of the boxes, still inside the old
    /// extents if the path chain constrains them.
    fn recompute_extents(&mut self) {
        let rect = match boxes_extents(self.boxes.iter()) {
            Some(bounds) => bounds.round_to_rectangle(),
            None => {
                self.set_all_clipped();
                return;
            }
        };

        if self.paths.is_none() {
            self.extents = rect;
        } else if !self.extents.intersect(&rect) {
            self.set_all_clipped();
            return;
        }

        self.invalidate_region();
    }

    /// Restrict the clip to the union of `boxes`, which must be disjoint.
    pub fn intersect_boxes(&mut self, boxes: &[FixedBox]) {
        if self.clip_all {
            return;
        }

        let boxes: TinyVec<[FixedBox; 1]> = boxes.iter().copied().filter(|b| !b.is_empty()).collect();
        match boxes.len() {
            0 => {
                self.set_all_clipped();
                return;
            }
            1 => {
                self.intersect_box(&boxes[0]);
                return;
            }
            _ => {}
        }

        if self.boxes.is_empty() {
            self.boxes = boxes;
        } else {
            let mut clipped = TinyVec::new();
            for old in self.boxes.iter() {
                for new in boxes.iter() {
                    let mut b = *old;
                    if b.intersect(new) {
                        clipped.push(b);
                    }
                }
            }
            self.boxes = clipped;
        }

        if self.boxes.is_empty() {
            self.set_all_clipped();
            return;
        }

        let rect = match boxes_extents(self.boxes.iter()) {
            Some(bounds) => bounds.round_to_rectangle(),
            None => return self.set_all_clipped(),
        };
        if !self.extents.intersect(&rect) {
            self.set_all_clipped();
            return;
        }
        self.clip_boxes_to_extents();
        if self.clip_all {
            return;
        }

        self.invalidate_region();
    }

    /// Keep the boxes inside the extents after the extents shrank.
    fn clip_boxes_to_extents(&mut self) {
        if self.boxes.is_empty() {
            return;
        }
        let limit = FixedBox::from_rectangle(&self.extents);
        self.boxes = self
            .boxes
            .iter()
            .filter_map(|b| {
                let mut b = *b;
                if b.intersect(&limit) {
                    Some(b)
                } else {
                    None
                }
            })
            .collect();
        if self.boxes.is_empty() {
            self.set_all_clipped();
        }
    }

    /// Restrict the clip to the fill of `path`.
    pub fn intersect_path(
        &mut self,
        path: &PathFixed,
        fill_rule: FillRule,
        tolerance: f64,
        antialias: Antialias,
    ) {
        if self.clip_all {
            return;
        }

        if path.fill_is_empty() {
            self.set_all_clipped();
            return;
        }

        if let Some(bx) = path.is_box() {
            log::trace!("clip path is a box");
            let bx = snap_box(bx, antialias);
            self.intersect_box(&bx);
            return;
        }

        if let Some(boxes) = path.fill_rectilinear_to_boxes(fill_rule) {
            log::trace!("clip path is rectilinear, split into {} boxes", boxes.len());
            let boxes: Vec<FixedBox> = boxes.into_iter().map(|b| snap_box(b, antialias)).collect();
            self.intersect_boxes(&boxes);
            return;
        }

        let bounds = path.approximate_clip_extents();
        if !self.extents.intersect(&bounds) {
            self.set_all_clipped();
            return;
        }
        self.clip_boxes_to_extents();
        if self.clip_all {
            return;
        }

        let paths = self.paths.get_or_insert_with(Default::default);
        Rc::make_mut(paths).push(ClipPath {
            path: path.clone(),
            fill_rule,
            tolerance,
            antialias,
        });
        self.invalidate_region();
    }

    /// Restrict this clip to the area of another one.
    pub fn intersect_clip(&mut self, other: &Clip) {
        if self.clip_all || other.is_unbounded() {
            return;
        }
        if other.clip_all {
            self.set_all_clipped();
            return;
        }

        if other.boxes.is_empty() {
            self.intersect_rectangle(&other.extents);
        } else {
            self.intersect_boxes(&other.boxes);
            if other.paths.is_some() && !self.clip_all {
                // the other clip's extents may be tighter than its boxes
                if !self.extents.intersect(&other.extents) {
                    self.set_all_clipped();
                }
            }
        }

        if let Some(paths) = &other.paths {
            for cp in paths.iter() {
                if self.clip_all {
                    return;
                }
                let chain = self.paths.get_or_insert_with(Default::default);
                Rc::make_mut(chain).push(cp.clone());
            }
            self.invalidate_region();
        }
    }

    /// Shift the clip by a whole number of pixels.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if self.clip_all || (dx == 0 && dy == 0) || self.is_unbounded() {
            return;
        }

        self.extents = self.extents.translate(dx, dy);

        let (fx, fy) = (Fixed::from_int(dx), Fixed::from_int(dy));
        for b in self.boxes.iter_mut() {
            *b = b.translate(fx, fy);
        }

        if let Some(paths) = &mut self.paths {
            for cp in Rc::make_mut(paths).iter_mut() {
                cp.path.translate(fx, fy);
            }
        }

        self.region = OnceCell::new();
    }

    /// Map the clip through `matrix`. Integer translations keep the boxes;
    /// anything else turns the clip into paths.
    #[must_use]
    pub fn transform(&self, matrix: &Matrix) -> Clip {
        if self.clip_all || self.is_unbounded() || matrix.is_identity() {
            return self.clone();
        }

        if let Some((dx, dy)) = matrix.integer_translation() {
            let mut clip = self.clone();
            clip.translate(dx, dy);
            return clip;
        }

        let mut clip = Clip::unbounded();

        let mut outline = PathFixed::new();
        if self.boxes.is_empty() {
            outline = PathFixed::from_box(&FixedBox::from_rectangle(&self.extents));
        } else {
            for b in self.boxes.iter() {
                append_box(&mut outline, b);
            }
        }
        outline.transform(matrix);
        clip.intersect_path(&outline, FillRule::NonZero, CLIP_BOX_TOLERANCE, Antialias::Default);

        if let Some(paths) = &self.paths {
            for cp in paths.iter() {
                let mut path = cp.path.clone();
                path.transform(matrix);
                clip.intersect_path(&path, cp.fill_rule, cp.tolerance, cp.antialias);
            }
        }

        clip
    }

    /// Whether drawing at `(x, y)` is allowed.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        if self.clip_all {
            return false;
        }

        let ext = &self.extents;
        if !self.is_unbounded()
            && !(x >= f64::from(ext.x)
                && x < f64::from(ext.x2())
                && y >= f64::from(ext.y)
                && y < f64::from(ext.y2()))
        {
            return false;
        }

        if !self.boxes.is_empty() {
            let (fx, fy) = (Fixed::from_f64(x), Fixed::from_f64(y));
            let pt = FixedPoint::new(fx, fy);
            if !self.boxes.iter().any(|b| b.contains_point(pt)) {
                return false;
            }
        }

        self.paths()
            .all(|cp| cp.path.in_fill(x, y, cp.fill_rule, cp.tolerance))
    }

    /// Whether the whole of `rect` is inside the clip.
    #[must_use]
    pub fn contains_rectangle(&self, rect: &Rectangle) -> bool {
        if self.clip_all {
            return false;
        }
        if self.is_unbounded() {
            return true;
        }
        if !self.extents.contains_rectangle(rect) {
            return false;
        }

        let bx = FixedBox::from_rectangle(rect);
        if !self.boxes.is_empty() && !self.boxes.iter().any(|b| b.contains_box(&bx)) {
            return false;
        }

        self.paths()
            .all(|cp| path_covers_box(&cp.path, cp.fill_rule, cp.tolerance, &bx))
    }

    /// Tighten the extents using the actual geometry of the path chain.
    pub fn reduce_to_boxes(&mut self) {
        if self.clip_all || self.paths.is_none() {
            return;
        }

        let limits = self.limits();
        let mut tight: Option<FixedBox> = None;

        for cp in self.paths() {
            let mut polygon = Polygon::with_limits(&limits);
            cp.path.fill_to_polygon(cp.tolerance, &mut polygon);

            let bounds = match polygon.extents() {
                Some((x1, y1, x2, y2)) => FixedBox::from_f64(x1, y1, x2, y2),
                None => FixedBox::default(),
            };

            match tight.as_mut() {
                None => tight = Some(bounds),
                Some(t) => {
                    if !t.intersect(&bounds) {
                        *t = FixedBox::default();
                    }
                }
            }
        }

        match tight {
            Some(t) if !t.is_empty() => {
                if !self.extents.intersect(&t.round_to_rectangle()) {
                    self.set_all_clipped();
                }
            }
            _ => self.set_all_clipped(),
        }
    }

    /// The boxes that bound the clip, for use as polygon limits.
    fn limits(&self) -> Vec<FixedBox> {
        if self.boxes.is_empty() {
            alloc::vec![FixedBox::from_rectangle(&self.extents)]
        } else {
            self.boxes.iter().copied().collect()
        }
    }

    /// One polygon per path in the chain, limited to the clip's boxes, for
    /// backends that rasterise the chain themselves.
    #[must_use]
    pub fn get_polygons(&self) -> Vec<(Polygon, FillRule)> {
        let limits = self.limits();
        self.paths()
            .map(|cp| {
                let mut polygon = Polygon::with_limits(&limits);
                cp.path.fill_to_polygon(cp.tolerance, &mut polygon);
                (polygon, cp.fill_rule)
            })
            .collect()
    }

    /// The clip as a pixel region, if it is one. The region is computed
    /// once and shared between copies of this clip.
    #[must_use]
    pub fn region(&self) -> Option<Rc<Region>> {
        if self.clip_all {
            return Some(Rc::new(Region::new()));
        }
        if !self.is_region {
            return None;
        }

        let region = self.region.get_or_init(|| {
            if self.boxes.is_empty() {
                Rc::new(Region::from_rectangles(&[self.extents]))
            } else {
                Rc::new(Region::from_boxes(&self.boxes))
            }
        });
        Some(region.clone())
    }

    /// The clip as a list of integer rectangles, or `None` if it cannot be
    /// expressed as one.
    #[must_use]
    pub fn rectangles(&self) -> Option<Vec<Rectangle>> {
        if self.clip_all {
            return Some(Vec::new());
        }
        if self.is_unbounded() {
            return None;
        }
        self.region().map(|region| region.rectangles().to_vec())
    }

    /// Whether two clips describe the same area by construction.
    #[must_use]
    pub fn equal(&self, other: &Clip) -> bool {
        if self.clip_all || other.clip_all {
            return self.clip_all == other.clip_all;
        }

        if self.extents != other.extents || self.boxes != other.boxes {
            return false;
        }

        match (&self.paths, &other.paths) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

fn append_box(path: &mut PathFixed, b: &FixedBox) {
    path.move_to(b.p1);
    path.line_to(FixedPoint::new(b.p2.x, b.p1.y));
    path.line_to(b.p2);
    path.line_to(FixedPoint::new(b.p1.x, b.p2.y));
    path.close_path();
}

/// Without antialiasing a box covers exactly the pixels its rounded
/// corners enclose.
fn snap_box(bx: FixedBox, antialias: Antialias) -> FixedBox {
    if antialias != Antialias::None {
        return bx;
    }

    let snap = |f: Fixed| Fixed::from_int(f.round());
    FixedBox::new(
        FixedPoint::new(snap(bx.p1.x), snap(bx.p1.y)),
        FixedPoint::new(snap(bx.p2.x), snap(bx.p2.y)),
    )
}

/// Whether filling `path` covers every point of `bx`.
///
/// The path is flattened with `bx` as the only limit. Edges outside the box
/// fold onto its left and right sides, so the box is covered exactly when no
/// edge is left in its interior and its centre is filled.
fn path_covers_box(path: &PathFixed, fill_rule: FillRule, tolerance: f64, bx: &FixedBox) -> bool {
    const EPSILON: f64 = 1e-9;

    let mut polygon = Polygon::with_limits(&[*bx]);
    path.fill_to_polygon(tolerance, &mut polygon);

    let (x1, y1, x2, y2) = bx.to_f64();
    let on_side = |x: f64| (x - x1).abs() <= EPSILON || (x - x2).abs() <= EPSILON;
    let interior_edge = polygon
        .edges()
        .iter()
        .any(|e| !(on_side(e.x_at(e.top)) && on_side(e.x_at(e.bottom))));

    !interior_edge && polygon.contains_point((x1 + x2) * 0.5, (y1 + y2) * 0.5, fill_rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> FixedPoint {
        FixedPoint::from_f64(x, y)
    }

    fn triangle() -> PathFixed {
        let mut path = PathFixed::new();
        path.move_to(pt(0.0, 0.0));
        path.line_to(pt(100.0, 0.0));
        path.line_to(pt(0.0, 100.0));
        path.close_path();
        path
    }

    #[test]
    fn disjoint_rectangles_clip_everything() {
        let mut clip = Clip::unbounded();
        clip.intersect_rectangle(&Rectangle::new(10, 10, 50, 50));
        assert!(!clip.is_all_clipped());
        assert_eq!(*clip.extents(), Rectangle::new(10, 10, 50, 50));

        clip.intersect_rectangle(&Rectangle::new(200, 200, 10, 10));
        assert!(clip.is_all_clipped());
        assert!(!clip.contains_point(20.0, 20.0));
    }

    #[test]
    fn intersect_box_is_idempotent() {
        let mut clip = Clip::from_boxes(&[
            FixedBox::from_f64(0.0, 0.0, 10.0, 10.0),
            FixedBox::from_f64(20.0, 0.0, 30.0, 10.0),
        ]);
        let bx = FixedBox::from_f64(5.0, 2.0, 25.0, 8.0);

        clip.intersect_box(&bx);
        let once = clip.clone();
        clip.intersect_box(&bx);
        assert!(clip.equal(&once));
        assert_eq!(clip.boxes().len(), 2);
        assert_eq!(*clip.extents(), Rectangle::new(5, 2, 20, 6));
    }

    #[test]
    fn extents_only_shrink() {
        let rects = [
            Rectangle::new(0, 0, 100, 100),
            Rectangle::new(50, -10, 100, 30),
            Rectangle::new(-5, -5, 1000, 1000),
            Rectangle::new(60, 5, 2, 2),
        ];

        let mut clip = Clip::unbounded();
        for r in rects.iter() {
            let before = *clip.extents();
            clip.intersect_rectangle(r);
            assert!(before.contains_rectangle(clip.extents()));
        }
        assert_eq!(*clip.extents(), Rectangle::new(60, 5, 2, 2));
    }

    #[test]
    fn box_paths_take_the_fast_route() {
        let mut clip = Clip::unbounded();
        clip.intersect_path(
            &PathFixed::from_box(&FixedBox::from_f64(1.0, 2.0, 3.0, 4.0)),
            FillRule::NonZero,
            0.1,
            Antialias::Default,
        );
        assert!(!clip.has_paths());
        assert!(clip.is_region());
        assert_eq!(clip.boxes(), &[FixedBox::from_f64(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn unaligned_boxes_are_not_regions() {
        let clip = Clip::from_boxes(&[FixedBox::from_f64(0.5, 0.0, 10.0, 10.0)]);
        assert!(!clip.is_region());
        assert!(clip.region().is_none());
        assert!(clip.rectangles().is_none());

        let clip = Clip::from_rectangle(&Rectangle::new(0, 0, 10, 10));
        assert_eq!(clip.rectangles(), Some(alloc::vec![Rectangle::new(0, 0, 10, 10)]));
    }

    #[test]
    fn paths_are_chained() {
        let mut clip = Clip::from_rectangle(&Rectangle::new(0, 0, 200, 200));
        clip.intersect_path(&triangle(), FillRule::NonZero, 0.1, Antialias::Default);

        assert!(clip.has_paths());
        assert!(!clip.is_region());
        assert!(clip.rectangles().is_none());
        assert_eq!(*clip.extents(), Rectangle::new(0, 0, 100, 100));

        assert!(clip.contains_point(10.0, 10.0));
        assert!(!clip.contains_point(90.0, 90.0));
        assert!(clip.contains_rectangle(&Rectangle::new(10, 10, 20, 20)));
        assert!(!clip.contains_rectangle(&Rectangle::new(40, 40, 30, 30)));

        // copies share the chain
        let copy = clip.clone();
        assert!(copy.equal(&clip));
    }

    #[test]
    fn reduce_tightens_extents() {
        let mut clip = Clip::from_rectangle(&Rectangle::new(0, 0, 200, 200));
        let mut path = PathFixed::new();
        path.move_to(pt(10.0, 10.0));
        path.line_to(pt(50.0, 20.0));
        path.line_to(pt(20.0, 50.0));
        path.close_path();
        clip.intersect_path(&path, FillRule::NonZero, 0.1, Antialias::Default);

        clip.reduce_to_boxes();
        assert_eq!(*clip.extents(), Rectangle::new(10, 10, 40, 40));
    }

    #[test]
    fn transform_by_integer_translation_keeps_boxes() {
        let clip = Clip::from_rectangle(&Rectangle::new(0, 0, 10, 10));
        let moved = clip.transform(&Matrix::translation(5.0, 5.0));
        assert_eq!(*moved.extents(), Rectangle::new(5, 5, 10, 10));
        assert!(!moved.has_paths());

        let rotated = clip.transform(&Matrix::rotation(0.5));
        assert!(rotated.has_paths());
    }
}
