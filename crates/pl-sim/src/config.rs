//! Simulation configuration and its validation.

use crate::error::ConfigError;
use pl_controls::PidController;
use pl_core::{ensure_finite, ensure_non_negative, ensure_positive, whole_steps};
use serde::{Deserialize, Serialize};

/// Upper bound on ticks per run; bounds the memory of the sample sequence.
pub const MAX_TICK_COUNT: usize = 10_000_000;

/// Parameters of one simulation run.
///
/// Missing fields in serialized form fall back to the reference scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rotational inertia of the rigid body (kg·m²)
    pub inertia: f64,
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Maximum commanded torque magnitude (N·m)
    pub saturation_limit: f64,
    /// Standard deviation of measurement noise (rad)
    pub noise_level: f64,
    pub anti_windup_enabled: bool,
    /// Target position (rad)
    pub reference: f64,
    /// Fixed tick duration (seconds)
    pub time_step: f64,
    /// Simulated span (seconds)
    pub total_time: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inertia: 1.0,
            kp: 15.0,
            ki: 5.0,
            kd: 10.0,
            saturation_limit: 2.0,
            noise_level: 0.02,
            anti_windup_enabled: true,
            reference: 1.0,
            time_step: 0.01,
            total_time: 20.0,
        }
    }
}

impl SimulationConfig {
    /// Check every field constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_count().map(|_| ())
    }

    /// Validate and return `floor(total_time / time_step)`.
    pub fn tick_count(&self) -> Result<usize, ConfigError> {
        ensure_positive(self.inertia, "inertia")?;
        ensure_non_negative(self.kp, "kp")?;
        ensure_non_negative(self.ki, "ki")?;
        ensure_non_negative(self.kd, "kd")?;
        ensure_positive(self.saturation_limit, "saturation_limit")?;
        ensure_non_negative(self.noise_level, "noise_level")?;
        ensure_finite(self.reference, "reference")?;
        let dt = ensure_positive(self.time_step, "time_step")?;
        let span = ensure_positive(self.total_time, "total_time")?;

        let ticks = whole_steps(span, dt);
        if !ticks.is_finite() || ticks > MAX_TICK_COUNT as f64 {
            return Err(ConfigError::TooManyTicks {
                ticks,
                limit: MAX_TICK_COUNT,
            });
        }
        Ok(ticks as usize)
    }

    /// Controller described by this configuration.
    pub fn controller(&self) -> Result<PidController, ConfigError> {
        let pid = PidController::new(self.kp, self.ki, self.kd, self.saturation_limit)?;
        Ok(pid.with_anti_windup(self.anti_windup_enabled))
    }

    /// Same configuration without measurement noise.
    pub fn noise_free(&self) -> Self {
        Self {
            noise_level: 0.0,
            ..self.clone()
        }
    }
}
