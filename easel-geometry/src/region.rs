// MIT/Apache2 License

use crate::{boxes_union, FixedBox, Rectangle};
use alloc::vec::Vec;

/// How a rectangle relates to a region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RegionOverlap {
    /// The rectangle lies entirely inside the region.
    In,
    /// The rectangle does not touch the region.
    Out,
    /// The rectangle is partly inside the region.
    Part,
}

/// A pixel-aligned area made of disjoint rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// The bounding box of the region.
    extents: Rectangle,
    /// The disjoint rectangles that make up the region.
    rects: Vec<Rectangle>,
}

impl FromIterator<Rectangle> for Region {
    fn from_iter<I: IntoIterator<Item = Rectangle>>(iter: I) -> Self {
        let rects: Vec<Rectangle> = iter.into_iter().collect();
        Region::from_rectangles(&rects)
    }
}

impl Region {
    /// Create an empty region.
    #[must_use]
    pub fn new() -> Region {
        Region::default()
    }

    /// Create a region covering the union of `rects`, which may overlap.
    #[must_use]
    pub fn from_rectangles(rects: &[Rectangle]) -> Region {
        let boxes: Vec<FixedBox> = rects
            .iter()
            .filter(|r| !r.is_empty())
            .map(FixedBox::from_rectangle)
            .collect();
        Region::from_boxes(&boxes)
    }

    /// Create a region covering the union of `boxes`, rounded out to the
    /// pixel grid.
    #[must_use]
    pub fn from_boxes(boxes: &[FixedBox]) -> Region {
        let mut region = Region::default();
        for bx in boxes_union(boxes) {
            region.add(bx.round_to_rectangle());
        }
        region
    }

    /// Add new bounds to accomodate a rectangle.
    fn accomodate(&mut self, rect: &Rectangle) {
        if self.rects.is_empty() {
            self.extents = *rect;
        } else {
            self.extents.union(rect);
        }
    }

    fn add(&mut self, rect: Rectangle) {
        if rect.is_empty() {
            return;
        }
        self.accomodate(&rect);
        self.rects.push(rect);
    }

    fn recompute_extents(&mut self) {
        let rects = core::mem::take(&mut self.rects);
        self.extents = Rectangle::default();
        for rect in rects {
            self.add(rect);
        }
    }

    #[inline]
    #[must_use]
    pub fn extents(&self) -> Rectangle {
        self.extents
    }

    #[inline]
    #[must_use]
    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rects
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.extents.contains_point(x, y) && self.rects.iter().any(|r| r.contains_point(x, y))
    }

    /// Tell whether `rect` lies inside, outside or across the edge of the
    /// region.
    #[must_use]
    pub fn contains_rectangle(&self, rect: &Rectangle) -> RegionOverlap {
        if rect.is_empty() {
            return RegionOverlap::Out;
        }

        let mut clipped = *rect;
        if !clipped.intersect(&self.extents) {
            return RegionOverlap::Out;
        }

        // the rectangles are disjoint, so the covered areas add up
        let covered: i64 = self
            .rects
            .iter()
            .map(|r| {
                let mut part = *rect;
                if part.intersect(r) {
                    i64::from(part.width) * i64::from(part.height)
                } else {
                    0
                }
            })
            .sum();

        let area = i64::from(rect.width) * i64::from(rect.height);
        if covered == 0 {
            RegionOverlap::Out
        } else if covered == area {
            RegionOverlap::In
        } else {
            RegionOverlap::Part
        }
    }

    /// Restrict the region to `rect`.
    pub fn intersect_rectangle(&mut self, rect: &Rectangle) {
        for r in &mut self.rects {
            r.intersect(rect);
        }
        self.rects.retain(|r| !r.is_empty());
        self.recompute_extents();
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
        if !self.rects.is_empty() {
            self.extents = self.extents.translate(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangles_use_their_own_height() {
        let region = Region::from_rectangles(&[Rectangle::new(100, 5, 10, 20)]);
        assert_eq!(region.extents(), Rectangle::new(100, 5, 10, 20));
        assert!(region.contains_point(105, 24));
        assert!(!region.contains_point(105, 25));
    }

    #[test]
    fn overlapping_rectangles_are_merged() {
        let region = Region::from_rectangles(&[
            Rectangle::new(0, 0, 10, 10),
            Rectangle::new(5, 5, 10, 10),
        ]);
        assert_eq!(region.extents(), Rectangle::new(0, 0, 15, 15));

        let area: i32 = region.rectangles().iter().map(|r| r.width * r.height).sum();
        assert_eq!(area, 100 + 100 - 25);

        assert_eq!(region.contains_rectangle(&Rectangle::new(1, 1, 3, 3)), RegionOverlap::In);
        assert_eq!(region.contains_rectangle(&Rectangle::new(8, 8, 4, 4)), RegionOverlap::In);
        assert_eq!(region.contains_rectangle(&Rectangle::new(0, 8, 8, 4)), RegionOverlap::Part);
        assert_eq!(region.contains_rectangle(&Rectangle::new(11, 0, 4, 4)), RegionOverlap::Out);
    }

    #[test]
    fn intersect_and_translate() {
        let mut region = Region::from_rectangles(&[
            Rectangle::new(0, 0, 10, 10),
            Rectangle::new(20, 0, 10, 10),
        ]);
        region.intersect_rectangle(&Rectangle::new(5, 0, 10, 10));
        assert_eq!(region.rectangles(), &[Rectangle::new(5, 0, 5, 10)]);

        region.translate(1, 2);
        assert_eq!(region.extents(), Rectangle::new(6, 2, 5, 10));

        region.intersect_rectangle(&Rectangle::new(100, 100, 1, 1));
        assert!(region.is_empty());
    }
}
