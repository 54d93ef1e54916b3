//! Single-flow-direction routing: every cell drains to its steepest
//! downslope neighbor.
//!
//! Routing is a pure function of the elevation field, so the per-cell work
//! is parallelized across cells with `rayon`; each output depends only on
//! the read-only elevations, which keeps the result deterministic.

use crate::grid::{RasterGrid, NEIGHBORS};
use rayon::prelude::*;

/// The receiver relation over the grid.
///
/// `receivers[i]` is the single downslope neighbor cell `i` drains into, or
/// `i` itself when the cell is a sink (boundary outlet or local pit).
/// `distances[i]` is the planimetric distance to the receiver, zero for
/// sinks. Both are recomputed from scratch every step because elevation
/// changes alter flow directions.
#[derive(Debug, Clone)]
pub struct FlowField {
    receivers: Vec<usize>,
    distances: Vec<f64>,
}

impl FlowField {
    /// Allocate a flow field sized for the given grid.
    #[must_use]
    pub fn new(grid: &RasterGrid) -> Self {
        let n = grid.len();
        Self {
            receivers: vec![0; n],
            distances: vec![0.0; n],
        }
    }

    /// Recompute the receiver of every cell from the current elevations.
    ///
    /// Boundary cells are always self-receivers (outlets). An interior cell
    /// with no strictly lower neighbor is a local pit and also drains to
    /// itself; depression filling is intentionally not performed. Ties
    /// between equally steep neighbors are broken by the fixed scan order of
    /// [`NEIGHBORS`], so routing is reproducible.
    pub fn route(&mut self, grid: &RasterGrid) {
        let nx = grid.nx() as i64;
        let spacing = grid.spacing();
        let elevations = grid.elevations();

        self.receivers
            .par_iter_mut()
            .zip(self.distances.par_iter_mut())
            .enumerate()
            .for_each(|(i, (receiver, distance))| {
                let (x, y) = grid.coords(i);
                if grid.is_boundary(x, y) {
                    *receiver = i;
                    *distance = 0.0;
                    return;
                }

                let here = elevations[i];
                let mut best = i;
                let mut best_distance = 0.0;
                let mut best_slope = 0.0;
                for &(dx, dy, factor) in &NEIGHBORS {
                    // Interior cells have all 8 neighbors in range
                    let j = ((y as i64 + dy) * nx + x as i64 + dx) as usize;
                    let d = factor * spacing;
                    let slope = (here - elevations[j]) / d;
                    if slope > best_slope {
                        best_slope = slope;
                        best = j;
                        best_distance = d;
                    }
                }

                *receiver = best;
                *distance = best_distance;
            });
    }

    /// Receiver of each cell, `receivers[i] == i` for sinks.
    #[inline]
    pub fn receivers(&self) -> &[usize] {
        &self.receivers
    }

    /// Distance from each cell to its receiver, zero for sinks.
    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Receiver of a single cell.
    #[inline]
    pub fn receiver(&self, index: usize) -> usize {
        self.receivers[index]
    }

    /// Whether a cell drains to itself.
    #[inline]
    pub fn is_sink(&self, index: usize) -> bool {
        self.receivers[index] == index
    }
}
