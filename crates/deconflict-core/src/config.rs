//! Engine tuning parameters.

use crate::error::DeconflictError;
use serde::{Deserialize, Serialize};

/// Configuration for the deconfliction engine.
///
/// Defaults are sized for small multirotor traffic (cruise speeds below
/// ~30 m/s). The coarse buffer must stay comfortably above the largest
/// dynamic buffer the risk stage can produce, or Stage 1 may prune a drone
/// Stage 2 would have flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum safe separation in meters
    pub base_safety_buffer: f64,
    /// Pilot/system reaction time in seconds
    pub reaction_time: f64,
    /// Maximum evasion acceleration in m/s²
    pub max_accel: f64,
    /// GPS positioning uncertainty in meters
    pub gps_uncertainty: f64,
    /// Stage 1 proximity buffer in meters
    pub coarse_buffer: f64,
    /// Stage 1 sampling step in seconds
    pub coarse_step: f64,
    /// Stage 2 spatial cell edge in meters
    pub grid_cell_size: f64,
    /// Stage 2 temporal bucket in seconds
    pub grid_time_step: f64,
    /// Relative-velocity normalization scale in m/s
    pub v_ref: f64,
    /// Conflict-duration normalization scale in seconds
    pub d_ref: f64,
    /// Time-to-collision normalization scale in seconds
    pub ttc_ref: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_safety_buffer: 50.0,
            reaction_time: 2.5,
            max_accel: 5.0,
            gps_uncertainty: 10.0,
            coarse_buffer: 200.0,
            coarse_step: 10.0,
            grid_cell_size: 100.0,
            grid_time_step: 1.0,
            v_ref: 30.0,
            d_ref: 10.0,
            ttc_ref: 10.0,
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges. Buffers, steps, and reference scales must
    /// be strictly positive; the reaction/acceleration/GPS terms must not be
    /// negative.
    pub fn validate(&self) -> Result<(), DeconflictError> {
        let positive = [
            ("base_safety_buffer", self.base_safety_buffer),
            ("coarse_buffer", self.coarse_buffer),
            ("coarse_step", self.coarse_step),
            ("grid_cell_size", self.grid_cell_size),
            ("grid_time_step", self.grid_time_step),
            ("v_ref", self.v_ref),
            ("d_ref", self.d_ref),
            ("ttc_ref", self.ttc_ref),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(DeconflictError::configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("reaction_time", self.reaction_time),
            ("max_accel", self.max_accel),
            ("gps_uncertainty", self.gps_uncertainty),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(DeconflictError::configuration(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Velocity-dependent minimum permissible separation:
    /// `base + v_rel·t_react + a_max·t_react²/2 + σ_gps`, never below base.
    pub fn dynamic_safety_buffer(&self, relative_velocity: f64) -> f64 {
        let velocity_term = relative_velocity * self.reaction_time;
        let accel_term = 0.5 * self.max_accel * self.reaction_time * self.reaction_time;
        let buffer = self.base_safety_buffer + velocity_term + accel_term + self.gps_uncertainty;
        buffer.max(self.base_safety_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let config = EngineConfig {
            coarse_step: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DeconflictError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_buffer() {
        let config = EngineConfig {
            base_safety_buffer: -1.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dynamic_buffer_formula() {
        let config = EngineConfig::default();
        // 50 + 20*2.5 + 0.5*5*6.25 + 10
        let buffer = config.dynamic_safety_buffer(20.0);
        assert!((buffer - 125.625).abs() < 1e-9);
    }

    #[test]
    fn test_dynamic_buffer_clamps_to_base() {
        let config = EngineConfig {
            reaction_time: 0.0,
            gps_uncertainty: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.dynamic_safety_buffer(0.0), 50.0);
    }
}
