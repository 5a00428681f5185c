//! Uniform grid for neighbor search.
//!
//! Particles are bucketed into square cells at least one smoothing radius
//! wide, so every neighbor within `h` lives in the 3x3 block of cells around
//! a query point. Buckets are stored flat with a prefix-sum offset table
//! (count, scan, scatter), so a rebuild reuses its allocations.
//!
//! Positions outside the grid are clamped to the border cells. Clamping never
//! moves two cells further apart, so the 3x3 search stays exhaustive for
//! particles that leave the viewport.

use bevy::prelude::*;

/// Upper bound on cells per axis. Larger domains get wider cells.
pub const MAX_CELLS_PER_AXIS: u32 = 1024;

/// How the solver enumerates neighbor candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeighborSearch {
    /// Uniform grid, O(n) per pass for bounded local density.
    #[default]
    Grid,
    /// Visit every particle, O(n²). Reference for testing.
    BruteForce,
}

/// Flat uniform grid over a rectangular domain.
#[derive(Clone, Debug, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    origin: Vec2,
    dims: UVec2,
    /// `cell_start[c]..cell_start[c + 1]` indexes `entries` for cell `c`.
    cell_start: Vec<usize>,
    /// Particle indices sorted by cell.
    entries: Vec<usize>,
    cell_of: Vec<usize>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the grid for `positions` over `[min, max]` with cells at
    /// least `min_cell_size` wide.
    pub fn build(&mut self, positions: &[Vec2], min: Vec2, max: Vec2, min_cell_size: f32) {
        let extent = (max - min).max(Vec2::splat(min_cell_size));
        let cell_size = min_cell_size
            .max(extent.x / MAX_CELLS_PER_AXIS as f32)
            .max(extent.y / MAX_CELLS_PER_AXIS as f32);

        self.cell_size = cell_size;
        self.origin = min;
        self.dims = UVec2::new(
            ((extent.x / cell_size).ceil() as u32).max(1),
            ((extent.y / cell_size).ceil() as u32).max(1),
        );

        let cell_count = (self.dims.x * self.dims.y) as usize;

        // Count
        self.cell_start.clear();
        self.cell_start.resize(cell_count + 1, 0);
        self.cell_of.clear();
        self.cell_of.reserve(positions.len());
        for &pos in positions {
            let cell = self.cell_index(self.cell_coord(pos));
            self.cell_of.push(cell);
            self.cell_start[cell + 1] += 1;
        }

        // Exclusive prefix sum
        for c in 0..cell_count {
            self.cell_start[c + 1] += self.cell_start[c];
        }

        // Scatter
        self.entries.clear();
        self.entries.resize(positions.len(), 0);
        let mut cursor = self.cell_start.clone();
        for (i, &cell) in self.cell_of.iter().enumerate() {
            self.entries[cursor[cell]] = i;
            cursor[cell] += 1;
        }
    }

    /// Width of a grid cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cells per axis.
    pub fn dims(&self) -> UVec2 {
        self.dims
    }

    /// Clamped cell coordinate for a position.
    pub fn cell_coord(&self, position: Vec2) -> IVec2 {
        let relative = (position - self.origin) / self.cell_size;
        // `as` saturates and maps NaN to 0, so runaway particles cannot panic here
        IVec2::new(
            (relative.x.floor() as i32).clamp(0, self.dims.x as i32 - 1),
            (relative.y.floor() as i32).clamp(0, self.dims.y as i32 - 1),
        )
    }

    fn cell_index(&self, coord: IVec2) -> usize {
        coord.y as usize * self.dims.x as usize + coord.x as usize
    }

    /// Particles in the cell containing `position`.
    pub fn cell_entries(&self, position: Vec2) -> &[usize] {
        let cell = self.cell_index(self.cell_coord(position));
        &self.entries[self.cell_start[cell]..self.cell_start[cell + 1]]
    }

    /// Call `visit` for every particle in the 3x3 cell block around
    /// `position`. Candidates still need a distance check.
    pub fn for_each_candidate(&self, position: Vec2, mut visit: impl FnMut(usize)) {
        if self.entries.is_empty() {
            return;
        }
        let center = self.cell_coord(position);
        let max = self.dims.as_ivec2() - IVec2::ONE;

        let y0 = (center.y - 1).max(0);
        let y1 = (center.y + 1).min(max.y);
        let x0 = (center.x - 1).max(0);
        let x1 = (center.x + 1).min(max.x);

        for y in y0..=y1 {
            // Cells in a row are contiguous, so one slice covers x0..=x1
            let first = self.cell_index(IVec2::new(x0, y));
            let last = self.cell_index(IVec2::new(x1, y));
            for &j in &self.entries[self.cell_start[first]..self.cell_start[last + 1]] {
                visit(j);
            }
        }
    }
}

/// Neighbor candidate enumeration over a set of positions.
#[derive(Clone, Copy)]
pub struct Neighborhood<'a> {
    positions: &'a [Vec2],
    grid: Option<&'a SpatialGrid>,
}

impl<'a> Neighborhood<'a> {
    pub fn new(positions: &'a [Vec2], search: NeighborSearch, grid: &'a SpatialGrid) -> Self {
        Self {
            positions,
            grid: match search {
                NeighborSearch::Grid => Some(grid),
                NeighborSearch::BruteForce => None,
            },
        }
    }

    /// Call `visit(j, offset, distance)` for every `j` with
    /// `|position - positions[j]| < radius`, including the query particle
    /// itself when it is part of the set.
    #[inline]
    pub fn for_each_within(
        &self,
        position: Vec2,
        radius: f32,
        mut visit: impl FnMut(usize, Vec2, f32),
    ) {
        let radius_sq = radius * radius;
        let mut check = |j: usize| {
            let offset = position - self.positions[j];
            let dist_sq = offset.length_squared();
            if dist_sq < radius_sq {
                visit(j, offset, dist_sq.sqrt());
            }
        };

        match self.grid {
            Some(grid) => grid.for_each_candidate(position, &mut check),
            None => (0..self.positions.len()).for_each(check),
        }
    }
}
