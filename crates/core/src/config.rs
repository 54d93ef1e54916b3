//! Model configuration and validation.
//!
//! All physical and numerical parameters of a run live in [`ModelConfig`].
//! The configuration is an immutable value passed into the simulation, never
//! ambient global state, so independent runs compose safely across threads.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Parameters of a landscape evolution run.
///
/// Defaults match the reference scenario: a 601 x 401 grid of 200 m cells
/// evolved for 10 Myr in 0.1 Myr steps, with stream-power exponents
/// `m = 0.4`, `n = 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Grid size in x (number of columns).
    pub nx: usize,
    /// Grid size in y (number of rows).
    pub ny: usize,
    /// Uniform grid spacing in x and y (m).
    pub spacing: f64,
    /// Stream-power erodibility coefficient K.
    pub erodibility: f64,
    /// Drainage-area exponent m of the stream-power law.
    pub area_exponent: f64,
    /// Slope exponent n of the stream-power law.
    pub slope_exponent: f64,
    /// Hillslope diffusivity D (m^2/yr).
    pub diffusivity: f64,
    /// Block uplift rate U (m/yr), applied to interior cells.
    pub uplift_rate: f64,
    /// Simulation time step (yr).
    pub time_step: f64,
    /// Total simulation duration (yr).
    pub total_time: f64,
    /// Amplitude of the random perturbation added to the initial flat
    /// surface (m). Zero gives a perfectly flat start.
    pub noise_amplitude: f64,
    /// Fixed elevation of the boundary outlet cells (m).
    pub boundary_elevation: f64,
    /// Seed for the initial surface perturbation.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            nx: 601,
            ny: 401,
            spacing: 200.0,
            erodibility: 1e-5,
            area_exponent: 0.4,
            slope_exponent: 1.0,
            diffusivity: 1e-1,
            uplift_rate: 1e-3,
            time_step: 1e5,
            total_time: 1e7,
            noise_amplitude: 1.0,
            boundary_elevation: 0.0,
            seed: 42,
        }
    }
}

impl ModelConfig {
    /// Check every parameter before a run starts.
    ///
    /// Rates and coefficients may be zero (disabling the corresponding
    /// process) but never negative or non-finite; invalid values are
    /// rejected here instead of being silently clamped.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nx < 3 || self.ny < 3 {
            return Err(ModelError::InvalidParameter(format!(
                "grid must be at least 3x3 to have interior cells, got {}x{}",
                self.nx, self.ny
            )));
        }
        Self::require_positive("spacing", self.spacing)?;
        Self::require_non_negative("erodibility", self.erodibility)?;
        Self::require_non_negative("area_exponent", self.area_exponent)?;
        Self::require_positive("slope_exponent", self.slope_exponent)?;
        Self::require_non_negative("diffusivity", self.diffusivity)?;
        Self::require_non_negative("uplift_rate", self.uplift_rate)?;
        Self::require_positive("time_step", self.time_step)?;
        Self::require_non_negative("total_time", self.total_time)?;
        Self::require_non_negative("noise_amplitude", self.noise_amplitude)?;
        if !self.boundary_elevation.is_finite() {
            return Err(ModelError::InvalidParameter(
                "boundary_elevation must be finite".to_string(),
            ));
        }
        Ok(())
    }

    fn require_positive(name: &str, value: f64) -> Result<(), ModelError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ModelError::InvalidParameter(format!(
                "{name} must be positive and finite, got {value}"
            )))
        }
    }

    fn require_non_negative(name: &str, value: f64) -> Result<(), ModelError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ModelError::InvalidParameter(format!(
                "{name} must be non-negative and finite, got {value}"
            )))
        }
    }
}
