//! Uniform raster grid with fixed-elevation boundary outlets.
//!
//! The grid owns the elevation field and the static topology: cell spacing,
//! 8-connected neighbor offsets, and the boundary classification. All four
//! edges are outlets whose elevation is clamped to a constant after every
//! step, which bounds the steady-state relief by the uplift/erosion balance.

use crate::error::ModelError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// 8-connected neighbor offsets `(dx, dy, distance factor)` in the fixed
/// scan order used everywhere routing ties must be broken deterministically.
pub const NEIGHBORS: [(i64, i64, f64); 8] = [
    (-1, -1, SQRT_2),
    (0, -1, 1.0),
    (1, -1, SQRT_2),
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (-1, 1, SQRT_2),
    (0, 1, 1.0),
    (1, 1, SQRT_2),
];

/// Regular 2D grid of elevation values in row-major order (`y * nx + x`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterGrid {
    nx: usize,
    ny: usize,
    spacing: f64,
    elevations: Vec<f64>,
}

impl RasterGrid {
    /// Create a flat grid at a uniform elevation.
    #[must_use]
    pub fn flat(nx: usize, ny: usize, spacing: f64, elevation: f64) -> Self {
        Self {
            nx,
            ny,
            spacing,
            elevations: vec![elevation; nx * ny],
        }
    }

    /// Create a nearly flat grid: zero elevation plus a uniform random
    /// perturbation in `[0, amplitude)` drawn from a seeded generator, so
    /// identical seeds yield identical surfaces.
    #[must_use]
    pub fn with_random_surface(
        nx: usize,
        ny: usize,
        spacing: f64,
        amplitude: f64,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let elevations = (0..nx * ny)
            .map(|_| rng.random::<f64>() * amplitude)
            .collect();
        Self {
            nx,
            ny,
            spacing,
            elevations,
        }
    }

    /// Wrap a supplied elevation array.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if the array length does not
    /// match `nx * ny`.
    pub fn from_elevations(
        nx: usize,
        ny: usize,
        spacing: f64,
        elevations: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if elevations.len() != nx * ny {
            return Err(ModelError::InvalidParameter(format!(
                "elevation array has {} cells, expected {}x{} = {}",
                elevations.len(),
                nx,
                ny,
                nx * ny
            )));
        }
        Ok(Self {
            nx,
            ny,
            spacing,
            elevations,
        })
    }

    /// Number of columns.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Uniform cell spacing (m).
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    /// True for the degenerate empty grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    /// Intrinsic area of a single cell (m^2).
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.spacing * self.spacing
    }

    /// Linear index of cell `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// Cell coordinates `(x, y)` of a linear index.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.nx, index / self.nx)
    }

    /// Whether cell `(x, y)` lies on a fixed-elevation edge.
    #[inline]
    pub fn is_boundary(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x == self.nx - 1 || y == self.ny - 1
    }

    /// Whether the cell at a linear index lies on a fixed-elevation edge.
    #[inline]
    pub fn is_boundary_index(&self, index: usize) -> bool {
        let (x, y) = self.coords(index);
        self.is_boundary(x, y)
    }

    /// Elevation at a linear index.
    #[inline]
    pub fn elevation(&self, index: usize) -> f64 {
        self.elevations[index]
    }

    /// Set elevation at a linear index.
    #[inline]
    pub fn set_elevation(&mut self, index: usize, value: f64) {
        self.elevations[index] = value;
    }

    /// The full elevation field, row-major.
    #[inline]
    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    /// Mutable access to the full elevation field.
    #[inline]
    pub fn elevations_mut(&mut self) -> &mut [f64] {
        &mut self.elevations
    }

    /// Consume the grid into its elevation vector.
    #[must_use]
    pub fn into_elevations(self) -> Vec<f64> {
        self.elevations
    }

    /// Pin every edge cell to the given elevation. Called after each step so
    /// the boundary acts as a fixed base level.
    pub fn clamp_boundaries(&mut self, elevation: f64) {
        let (nx, ny) = (self.nx, self.ny);
        for x in 0..nx {
            self.elevations[x] = elevation;
            self.elevations[(ny - 1) * nx + x] = elevation;
        }
        for y in 0..ny {
            self.elevations[y * nx] = elevation;
            self.elevations[y * nx + nx - 1] = elevation;
        }
    }

    /// Minimum elevation over the grid.
    pub fn min_elevation(&self) -> f64 {
        self.elevations.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Maximum elevation over the grid.
    pub fn max_elevation(&self) -> f64 {
        self.elevations
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean elevation over the grid.
    pub fn mean_elevation(&self) -> f64 {
        self.elevations.iter().sum::<f64>() / self.elevations.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        let grid = RasterGrid::flat(7, 5, 100.0, 0.0);
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(grid.coords(grid.index(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn boundary_classification() {
        let grid = RasterGrid::flat(4, 3, 100.0, 0.0);
        let boundary_count = (0..grid.len())
            .filter(|&i| grid.is_boundary_index(i))
            .count();
        // Only the 2x1 interior block is not boundary on a 4x3 grid
        assert_eq!(boundary_count, grid.len() - 2);
    }

    #[test]
    fn clamp_boundaries_pins_edges_only() {
        let mut grid = RasterGrid::flat(5, 5, 100.0, 3.0);
        grid.clamp_boundaries(0.0);
        for i in 0..grid.len() {
            if grid.is_boundary_index(i) {
                assert_eq!(grid.elevation(i), 0.0);
            } else {
                assert_eq!(grid.elevation(i), 3.0);
            }
        }
    }

    #[test]
    fn random_surface_is_reproducible() {
        let a = RasterGrid::with_random_surface(10, 8, 200.0, 1.0, 99);
        let b = RasterGrid::with_random_surface(10, 8, 200.0, 1.0, 99);
        assert_eq!(a.elevations(), b.elevations());

        let c = RasterGrid::with_random_surface(10, 8, 200.0, 1.0, 100);
        assert_ne!(a.elevations(), c.elevations());
    }

    #[test]
    fn from_elevations_checks_length() {
        assert!(RasterGrid::from_elevations(3, 3, 100.0, vec![0.0; 8]).is_err());
        assert!(RasterGrid::from_elevations(3, 3, 100.0, vec![0.0; 9]).is_ok());
    }
}
