//! Numerical solvers: implicit stream-power incision and implicit hillslope
//! diffusion.
//!
//! Both sub-steps are unconditionally stable for any time step. Incision
//! exploits the topological stack order to reduce a grid-wide nonlinear
//! system to one scalar solve per cell; diffusion uses an
//! alternating-direction-implicit sweep with tridiagonal solves per row and
//! column.

pub mod diffusion;
pub mod stream_power;

pub use diffusion::HillslopeDiffusion;
pub use stream_power::{incise, IncisionStats, StreamPowerParams};
