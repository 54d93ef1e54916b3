//! Landscape Evolution Core Library
//!
//! A deterministic forward model of landscape evolution on a regular 2D grid,
//! combining tectonic uplift, stream-power river incision, and hillslope
//! diffusion. Designed for use inside optimization and inversion loops, so a
//! run is a pure function of its configuration: same parameters and seed,
//! bit-identical output.
//!
//! The solver follows the O(n) implicit scheme of Braun & Willett (2013):
//! single-flow-direction routing, a stack-based topological ordering of the
//! drainage network, drainage-area accumulation along that order, and an
//! implicit stream-power update that needs no matrix assembly because every
//! cell's receiver is solved before the cell itself.

// Core types and configuration
pub mod config;
pub mod error;

// Grid and drainage network
pub mod flow;
pub mod grid;

// Numerical solvers and time-stepping driver
pub mod simulation;
pub mod solver;

// Re-export the main entry points
pub use config::ModelConfig;
pub use error::ModelError;
pub use grid::RasterGrid;

pub use flow::{accumulate_area, FlowField, FlowStack};
pub use simulation::{run_model, LandscapeSimulation, ModelOutput, RunSummary, StepDiagnostics};
pub use solver::{incise, HillslopeDiffusion, IncisionStats, StreamPowerParams};
