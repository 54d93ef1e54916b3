//! Time-stepping driver combining uplift, incision, and diffusion.
//!
//! Each step applies the operators in a fixed order — uplift, flow routing,
//! topological ordering, area accumulation, implicit incision, implicit
//! diffusion, boundary clamp — and nothing may be skipped or reordered:
//! determinism requires an identical floating-point operation sequence
//! across runs given identical inputs and seed.

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::flow::{accumulate_area, FlowField, FlowStack};
use crate::grid::RasterGrid;
use crate::solver::{incise, HillslopeDiffusion, StreamPowerParams};
use serde::Serialize;
use tracing::{debug, info};

/// Diagnostics from a single step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepDiagnostics {
    /// Incision cells that needed the bisection fallback this step.
    pub newton_fallbacks: usize,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Steps taken, including a final partial step if `total_time` is not a
    /// multiple of `time_step`.
    pub steps: u64,
    /// Simulated time actually covered (yr).
    pub simulated_time: f64,
    /// Total incision cells that needed the bisection fallback.
    pub newton_fallbacks: u64,
    /// Minimum elevation of the final field (m).
    pub min_elevation: f64,
    /// Maximum elevation of the final field (m).
    pub max_elevation: f64,
    /// Mean elevation of the final field (m).
    pub mean_elevation: f64,
}

/// Final state returned to callers: the evolved elevation field plus the
/// drainage area of the last step.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Grid size in x (columns).
    pub nx: usize,
    /// Grid size in y (rows).
    pub ny: usize,
    /// Grid spacing (m).
    pub spacing: f64,
    /// Final elevation field, row-major (m).
    pub elevations: Vec<f64>,
    /// Drainage area per cell from the final routing (m^2). Empty when the
    /// run took zero steps.
    pub drainage_area: Vec<f64>,
    /// Run statistics.
    pub summary: RunSummary,
}

/// A landscape evolution run in progress.
///
/// Owns the grid exclusively; independent simulations can run concurrently
/// with no shared mutable state. Scratch structures for routing, ordering,
/// area, and diffusion are allocated once and reused every step.
pub struct LandscapeSimulation {
    config: ModelConfig,
    grid: RasterGrid,
    flow: FlowField,
    stack: FlowStack,
    area: Vec<f64>,
    diffusion: HillslopeDiffusion,
    elapsed: f64,
    steps: u64,
    newton_fallbacks: u64,
}

impl LandscapeSimulation {
    /// Set up a run from a validated configuration: a flat initial surface
    /// plus a seeded random perturbation, boundaries pinned to the outlet
    /// elevation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if the configuration is
    /// rejected by [`ModelConfig::validate`].
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let mut grid = RasterGrid::with_random_surface(
            config.nx,
            config.ny,
            config.spacing,
            config.noise_amplitude,
            config.seed,
        );
        grid.clamp_boundaries(config.boundary_elevation);
        Ok(Self::from_parts(config, grid))
    }

    /// Set up a run from a supplied elevation field instead of the seeded
    /// perturbation. Boundary cells are pinned immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if the configuration is
    /// invalid or the grid dimensions disagree with it.
    pub fn from_grid(config: ModelConfig, mut grid: RasterGrid) -> Result<Self, ModelError> {
        config.validate()?;
        if grid.nx() != config.nx || grid.ny() != config.ny {
            return Err(ModelError::InvalidParameter(format!(
                "grid is {}x{} but configuration says {}x{}",
                grid.nx(),
                grid.ny(),
                config.nx,
                config.ny
            )));
        }
        grid.clamp_boundaries(config.boundary_elevation);
        Ok(Self::from_parts(config, grid))
    }

    fn from_parts(config: ModelConfig, grid: RasterGrid) -> Self {
        info!(
            "landscape simulation initialized: {}x{} grid, spacing {:.1} m, K={:.3e}, D={:.3e}, U={:.3e}",
            config.nx, config.ny, config.spacing,
            config.erodibility, config.diffusivity, config.uplift_rate
        );
        let flow = FlowField::new(&grid);
        let diffusion = HillslopeDiffusion::new(config.nx, config.ny);
        Self {
            config,
            grid,
            flow,
            stack: FlowStack::new(),
            area: Vec::new(),
            diffusion,
            elapsed: 0.0,
            steps: 0,
            newton_fallbacks: 0,
        }
    }

    /// Advance the model by one step of length `dt`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TopologyViolation`] if routing produced a
    /// cyclic receiver relation, which indicates a routing bug and aborts
    /// the run.
    pub fn step(&mut self, dt: f64) -> Result<StepDiagnostics, ModelError> {
        let config = &self.config;

        // 1. Block uplift on interior cells; boundaries stay at base level
        let uplift = config.uplift_rate * dt;
        let (nx, ny) = (config.nx, config.ny);
        let elevations = self.grid.elevations_mut();
        for y in 1..ny - 1 {
            for x in 1..nx - 1 {
                elevations[y * nx + x] += uplift;
            }
        }

        // 2. Drainage network of the uplifted surface
        self.flow.route(&self.grid);
        self.stack.rebuild(self.flow.receivers())?;
        accumulate_area(&self.flow, &self.stack, self.grid.cell_area(), &mut self.area);

        // 3. Implicit stream-power incision in stack order
        let params = StreamPowerParams {
            erodibility: config.erodibility,
            area_exponent: config.area_exponent,
            slope_exponent: config.slope_exponent,
        };
        let stats = incise(
            self.grid.elevations_mut(),
            &self.flow,
            &self.stack,
            &self.area,
            &params,
            dt,
        );

        // 4. Implicit hillslope diffusion
        self.diffusion.apply(&mut self.grid, config.diffusivity, dt);

        // 5. Boundary outlets back to base level
        self.grid.clamp_boundaries(config.boundary_elevation);

        self.elapsed += dt;
        self.steps += 1;
        self.newton_fallbacks += stats.newton_fallbacks as u64;

        debug!(
            "step {}: t={:.3e} yr, max elevation {:.2} m, {} Newton fallbacks",
            self.steps,
            self.elapsed,
            self.grid.max_elevation(),
            stats.newton_fallbacks
        );

        Ok(StepDiagnostics {
            newton_fallbacks: stats.newton_fallbacks,
        })
    }

    /// Run to `total_time`, taking `time_step`-sized steps and one final
    /// partial step for any remainder.
    ///
    /// # Errors
    ///
    /// Propagates the first fatal error from [`Self::step`].
    pub fn run(&mut self) -> Result<RunSummary, ModelError> {
        let mut remaining = self.config.total_time;
        while remaining > 0.0 {
            let dt = self.config.time_step.min(remaining);
            self.step(dt)?;
            remaining -= dt;
        }
        let summary = self.summary();
        info!(
            "run complete: {} steps over {:.3e} yr, relief {:.2} m",
            summary.steps,
            summary.simulated_time,
            summary.max_elevation - summary.min_elevation
        );
        Ok(summary)
    }

    /// Statistics of the current state.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.steps,
            simulated_time: self.elapsed,
            newton_fallbacks: self.newton_fallbacks,
            min_elevation: self.grid.min_elevation(),
            max_elevation: self.grid.max_elevation(),
            mean_elevation: self.grid.mean_elevation(),
        }
    }

    /// The grid and its current elevation field.
    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    /// Drainage area per cell from the most recent step (m^2). Empty before
    /// the first step.
    pub fn drainage_area(&self) -> &[f64] {
        &self.area
    }

    /// The configuration this run was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Simulated time elapsed so far (yr).
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }

    /// Steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Consume the simulation into its final output arrays.
    #[must_use]
    pub fn into_output(self) -> ModelOutput {
        let summary = self.summary();
        ModelOutput {
            nx: self.config.nx,
            ny: self.config.ny,
            spacing: self.config.spacing,
            elevations: self.grid.into_elevations(),
            drainage_area: self.area,
            summary,
        }
    }
}

/// Run a complete forward model: validate, initialize, evolve, return the
/// final elevation and drainage area.
///
/// This is the single entry point consumers (CLI, inversion frameworks)
/// call; it is a pure function of the configuration.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for a rejected configuration or
/// [`ModelError::TopologyViolation`] if routing breaks the forest invariant.
pub fn run_model(config: ModelConfig) -> Result<ModelOutput, ModelError> {
    let mut simulation = LandscapeSimulation::new(config)?;
    simulation.run()?;
    Ok(simulation.into_output())
}
