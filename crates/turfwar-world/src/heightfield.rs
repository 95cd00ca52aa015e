//! Heightfield: ground elevation grid with bilinear queries.

use glam::Vec2;

/// Regular grid of ground heights over a world-aligned rectangle.
#[derive(Debug, Clone)]
pub struct Heightfield {
    /// World position of the grid's (0, 0) corner.
    pub origin: Vec2,
    /// World units per cell on both axes.
    pub cell_size: f32,
    /// Number of columns (+X).
    pub cols: u32,
    /// Number of rows (+Y).
    pub rows: u32,
    /// Heights in world units, row-major from the origin corner.
    pub heights: Vec<f32>,
}

impl Heightfield {
    /// Create a heightfield from pre-loaded data.
    pub fn new(origin: Vec2, cell_size: f32, cols: u32, rows: u32, heights: Vec<f32>) -> Self {
        Self {
            origin,
            cell_size,
            cols,
            rows,
            heights,
        }
    }

    /// Create a uniform flat heightfield.
    pub fn flat(origin: Vec2, cell_size: f32, cols: u32, rows: u32, z: f32) -> Self {
        Self::new(origin, cell_size, cols, rows, vec![z; (cols * rows) as usize])
    }

    /// World extent covered by the grid: (min corner, max corner).
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let span = Vec2::new(self.cols as f32, self.rows as f32) * self.cell_size;
        (self.origin, self.origin + span)
    }

    /// Convert a world point to fractional grid (col, row).
    /// Returns None outside the grid.
    fn world_to_grid(&self, p: Vec2) -> Option<(f32, f32)> {
        let rel = (p - self.origin) / self.cell_size;
        if rel.x < 0.0 || rel.y < 0.0 || rel.x >= self.cols as f32 || rel.y >= self.rows as f32 {
            return None;
        }
        Some((rel.x, rel.y))
    }

    /// Raw height at integer grid coordinates.
    fn raw(&self, col: usize, row: usize) -> f32 {
        if col >= self.cols as usize || row >= self.rows as usize {
            return 0.0;
        }
        self.heights[row * self.cols as usize + col]
    }

    /// Ground height at a world point with bilinear interpolation.
    /// Returns None outside the grid.
    pub fn height_at(&self, p: Vec2) -> Option<f32> {
        let (col, row) = self.world_to_grid(p)?;
        Some(self.bilinear(col, row))
    }

    /// Bilinear interpolation at fractional (col, row).
    fn bilinear(&self, col: f32, row: f32) -> f32 {
        let c0 = col.floor() as usize;
        let r0 = row.floor() as usize;
        let c1 = (c0 + 1).min(self.cols as usize - 1);
        let r1 = (r0 + 1).min(self.rows as usize - 1);

        let fc = col - c0 as f32;
        let fr = row - r0 as f32;

        let h00 = self.raw(c0, r0);
        let h10 = self.raw(c1, r0);
        let h01 = self.raw(c0, r1);
        let h11 = self.raw(c1, r1);

        let bottom = h00 * (1.0 - fc) + h10 * fc;
        let top = h01 * (1.0 - fc) + h11 * fc;
        bottom * (1.0 - fr) + top * fr
    }
}
