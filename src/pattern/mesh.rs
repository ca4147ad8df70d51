// MIT/Apache2 License

use crate::{Color, Error, Result};

/// The order in which the twelve boundary points of a patch are visited,
/// as `(row, column)` in its control grid.
const BOUNDARY: [(usize, usize); 12] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 3),
    (2, 3),
    (3, 3),
    (3, 2),
    (3, 1),
    (3, 0),
    (2, 0),
    (1, 0),
];

/// The four interior control points.
const CONTROL_POINTS: [(usize, usize); 4] = [(1, 1), (1, 2), (2, 2), (2, 1)];

/// The four corners, in the order their colors are given.
pub(crate) const CORNERS: [(usize, usize); 4] = [(0, 0), (0, 3), (3, 3), (3, 0)];

/// A tensor-product patch: a 4x4 grid of control points and one color per
/// corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshPatch {
    pub points: [[(f64, f64); 4]; 4],
    pub colors: [Color; 4],
}

impl Default for MeshPatch {
    fn default() -> MeshPatch {
        MeshPatch {
            points: [[(0.0, 0.0); 4]; 4],
            colors: [Color::TRANSPARENT; 4],
        }
    }
}

impl MeshPatch {
    /// The corner point for the color at `corner`.
    #[inline]
    pub fn corner(&self, corner: usize) -> (f64, f64) {
        let (i, j) = CORNERS[corner % 4];
        self.points[i][j]
    }

    /// The bounds of every control point, which contain the patch.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.points.iter().flatten().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x1, y1, x2, y2), &(x, y)| (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
        )
    }

    /// Fill in an interior control point the way a Coons patch would have
    /// it, from the boundary alone.
    fn calc_control_point(&mut self, control_point: usize) {
        let (ci, cj) = CONTROL_POINTS[control_point];
        // walk the grid starting from the corner nearest this control point
        let flip_i = ci == 2;
        let flip_j = cj == 2;
        let at = |p: &[[(f64, f64); 4]; 4], i: usize, j: usize| {
            let i = if flip_i { 3 - i } else { i };
            let j = if flip_j { 3 - j } else { j };
            p[i][j]
        };

        let p = &self.points;
        let combine = |f: fn((f64, f64)) -> f64| {
            (-4.0 * f(at(p, 0, 0)) + 6.0 * (f(at(p, 0, 1)) + f(at(p, 1, 0)))
                - 2.0 * (f(at(p, 0, 3)) + f(at(p, 3, 0)))
                + 3.0 * (f(at(p, 3, 1)) + f(at(p, 1, 3)))
                - f(at(p, 3, 3)))
                / 9.0
        };
        let point = (combine(|pt| pt.0), combine(|pt| pt.1));
        self.points[ci][cj] = point;
    }
}

/// The patch being built, along with what has been set on it so far.
#[derive(Debug, Clone, Default)]
struct PatchBuilder {
    patch: MeshPatch,
    /// `None` before the first point, then the index of the last finished
    /// side, or `-1` after only `move_to`.
    current_side: Option<i32>,
    has_control_point: [bool; 4],
    has_color: [bool; 4],
}

/// The patches of a mesh gradient, along with the one under construction.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    patches: Vec<MeshPatch>,
    current: Option<PatchBuilder>,
}

impl Mesh {
    /// Finished patches, in the order they are painted.
    #[inline]
    pub fn patches(&self) -> &[MeshPatch] {
        &self.patches
    }

    fn current(&mut self) -> Result<&mut PatchBuilder> {
        self.current.as_mut().ok_or(Error::InvalidMeshConstruction)
    }

    pub(crate) fn begin_patch(&mut self) -> Result {
        if self.current.is_some() {
            return Err(Error::InvalidMeshConstruction);
        }
        self.current = Some(PatchBuilder::default());
        Ok(())
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) -> Result {
        let builder = self.current()?;
        if matches!(builder.current_side, Some(side) if side >= 0) {
            return Err(Error::InvalidMeshConstruction);
        }
        builder.current_side = Some(-1);
        builder.patch.points[0][0] = (x, y);
        Ok(())
    }

    pub(crate) fn line_to(&mut self, x: f64, y: f64) -> Result {
        let builder = self.current()?;
        let side = match builder.current_side {
            None => return self.move_to(x, y),
            Some(side) => side,
        };
        if side >= 3 {
            return Err(Error::InvalidMeshConstruction);
        }

        #[allow(clippy::cast_sign_loss)]
        let (i, j) = BOUNDARY[((side + 1) * 3) as usize];
        let (lx, ly) = builder.patch.points[i][j];
        let (dx, dy) = ((x - lx) / 3.0, (y - ly) / 3.0);
        self.curve_to(
            (lx + dx, ly + dy),
            (x - dx, y - dy),
            (x, y),
        )
    }

    pub(crate) fn curve_to(&mut self, p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> Result {
        if self.current()?.current_side.is_none() {
            self.move_to(p1.0, p1.1)?;
        }

        let builder = self.current()?;
        let side = builder.current_side.unwrap_or(-1) + 1;
        if side > 3 {
            return Err(Error::InvalidMeshConstruction);
        }
        builder.current_side = Some(side);

        #[allow(clippy::cast_sign_loss)]
        let base = (side * 3) as usize;
        for (offset, point) in [p1, p2, p3].into_iter().enumerate() {
            let index = base + offset + 1;
            // the last side ends where the first one began
            if index < BOUNDARY.len() {
                let (i, j) = BOUNDARY[index];
                builder.patch.points[i][j] = point;
            }
        }
        Ok(())
    }

    pub(crate) fn set_control_point(&mut self, point: usize, x: f64, y: f64) -> Result {
        if point >= 4 {
            return Err(Error::InvalidIndex);
        }
        let builder = self.current()?;
        let (i, j) = CONTROL_POINTS[point];
        builder.patch.points[i][j] = (x, y);
        builder.has_control_point[point] = true;
        Ok(())
    }

    pub(crate) fn set_corner_color(&mut self, corner: usize, color: Color) -> Result {
        if corner >= 4 {
            return Err(Error::InvalidIndex);
        }
        let builder = self.current()?;
        builder.patch.colors[corner] = color;
        builder.has_color[corner] = true;
        Ok(())
    }

    pub(crate) fn end_patch(&mut self) -> Result {
        let (x, y) = {
            let builder = self.current()?;
            if builder.current_side.is_none() {
                return Err(Error::InvalidMeshConstruction);
            }
            builder.patch.points[0][0]
        };

        // close the outline with straight sides, carrying the first color
        // around to corners that were never given one
        while self.current()?.current_side.unwrap_or(-1) < 3 {
            self.line_to(x, y)?;
            let builder = self.current()?;
            #[allow(clippy::cast_sign_loss)]
            let corner = (builder.current_side.unwrap_or(-1) + 1) as usize;
            if corner < 4 && !builder.has_color[corner] {
                builder.patch.colors[corner] = builder.patch.colors[0];
                builder.has_color[corner] = true;
            }
        }

        let mut builder = self.current.take().ok_or(Error::InvalidMeshConstruction)?;
        for i in 0..4 {
            if !builder.has_control_point[i] {
                builder.patch.calc_control_point(i);
            }
            if !builder.has_color[i] {
                builder.patch.colors[i] = Color::TRANSPARENT;
            }
        }

        self.patches.push(builder.patch);
        Ok(())
    }
}
