//! PID controller with output saturation and anti-windup.
//!
//! Each update performs, in order:
//! 1. `error = reference - measured`
//! 2. derivative from the backward difference `(error - previous_error) / dt`
//! 3. proportional term `kp * error`
//! 4. the error is folded into the running sum *before* the integral term
//!    `ki * error_integral * dt` is formed
//! 5. the three terms are summed and clamped to `±saturation_limit`
//! 6. when the clamp engaged and anti-windup is enabled, this tick's error is
//!    taken back out of the running sum
//!
//! The accumulate-then-scale order with the post-saturation undo is part of
//! the controller's contract and differs from trapezoidal or pre-clamped
//! formulations.

use crate::error::ControlResult;
use pl_core::{ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (applied to the running error sum times `dt`).
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Maximum command magnitude.
    pub saturation_limit: f64,
    /// Undo the integral accumulation on saturated ticks.
    pub anti_windup: bool,
}

impl PidController {
    /// Create a new PID controller with anti-windup enabled.
    ///
    /// Zero gains are accepted, so P-only, I-only, D-only and open-loop
    /// controllers are all valid.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain (>= 0)
    /// * `ki` - Integral gain (>= 0)
    /// * `kd` - Derivative gain (>= 0)
    /// * `saturation_limit` - Maximum command magnitude (> 0)
    pub fn new(kp: f64, ki: f64, kd: f64, saturation_limit: f64) -> ControlResult<Self> {
        Ok(Self {
            kp: ensure_non_negative(kp, "kp")?,
            ki: ensure_non_negative(ki, "ki")?,
            kd: ensure_non_negative(kd, "kd")?,
            saturation_limit: ensure_positive(saturation_limit, "saturation_limit")?,
            anti_windup: true,
        })
    }

    /// Enable or disable anti-windup.
    pub fn with_anti_windup(mut self, enabled: bool) -> Self {
        self.anti_windup = enabled;
        self
    }

    /// Clamp a raw command to the saturation limit.
    ///
    /// Returns the command and whether the clamp engaged.
    pub fn saturate(&self, raw: f64) -> (f64, bool) {
        if raw.abs() > self.saturation_limit {
            (raw.signum() * self.saturation_limit, true)
        } else {
            (raw, false)
        }
    }

    /// Compute the controller output for one tick.
    ///
    /// # Arguments
    ///
    /// * `state` - Controller state carried over from the previous tick
    /// * `measured` - Measured (possibly noisy) position
    /// * `reference` - Target position
    /// * `dt` - Tick duration in seconds, validated positive by the caller
    ///
    /// # Returns
    ///
    /// Next state and the tick's output.
    pub fn update(
        &self,
        state: &PidState,
        measured: f64,
        reference: f64,
        dt: f64,
    ) -> (PidState, PidOutput) {
        let error = reference - measured;

        let d_term = self.kd * (error - state.previous_error) / dt;
        let p_term = self.kp * error;

        let accumulated = state.error_integral + error;
        let i_term = self.ki * accumulated * dt;

        let raw_command = p_term + i_term + d_term;
        let (command, saturated) = self.saturate(raw_command);

        let error_integral = if saturated && self.anti_windup {
            accumulated - error
        } else {
            accumulated
        };

        let next = PidState {
            error_integral,
            previous_error: error,
        };
        let output = PidOutput {
            command,
            raw_command,
            error,
            p_term,
            i_term,
            d_term,
            saturated,
        };

        (next, output)
    }
}

/// PID controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    /// Running sum of tracking errors (not scaled by `dt`).
    pub error_integral: f64,
    /// Error from the previous tick, for the derivative.
    pub previous_error: f64,
}

/// Result of one controller update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidOutput {
    /// Command after saturation.
    pub command: f64,
    /// Command before saturation.
    pub raw_command: f64,
    /// Tracking error `reference - measured`.
    pub error: f64,
    pub p_term: f64,
    pub i_term: f64,
    pub d_term: f64,
    /// Whether the saturation clamp engaged.
    pub saturated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.01;

    #[test]
    fn pid_controller_creation() {
        let pid = PidController::new(15.0, 5.0, 10.0, 2.0).unwrap();
        assert_eq!(pid.kp, 15.0);
        assert_eq!(pid.saturation_limit, 2.0);
        assert!(pid.anti_windup);
        assert!(!pid.with_anti_windup(false).anti_windup);
    }

    #[test]
    fn invalid_controller_params() {
        assert!(PidController::new(-1.0, 0.0, 0.0, 1.0).is_err());
        assert!(PidController::new(0.0, -1.0, 0.0, 1.0).is_err());
        assert!(PidController::new(0.0, 0.0, -1.0, 1.0).is_err());
        assert!(PidController::new(1.0, 1.0, 1.0, 0.0).is_err());
        assert!(PidController::new(f64::NAN, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn proportional_only() {
        let pid = PidController::new(2.0, 0.0, 0.0, 10.0).unwrap();
        let (_, out) = pid.update(&PidState::default(), 0.5, 1.0, DT);
        assert_eq!(out.error, 0.5);
        assert_eq!(out.command, 1.0);
        assert!(!out.saturated);
    }

    #[test]
    fn integral_accumulates_before_scaling() {
        let pid = PidController::new(0.0, 5.0, 0.0, 10.0).unwrap();
        let state = PidState {
            error_integral: 3.0,
            previous_error: 0.0,
        };
        let (next, out) = pid.update(&state, 0.0, 1.0, DT);
        // The current error is part of the sum that gets scaled.
        assert!((out.i_term - 5.0 * 4.0 * DT).abs() < 1e-12);
        assert_eq!(next.error_integral, 4.0);
    }

    #[test]
    fn derivative_uses_backward_difference() {
        let pid = PidController::new(0.0, 0.0, 2.0, 100.0).unwrap();
        let state = PidState {
            error_integral: 0.0,
            previous_error: 0.25,
        };
        let (next, out) = pid.update(&state, 0.5, 1.0, DT);
        assert!((out.d_term - 2.0 * (0.5 - 0.25) / DT).abs() < 1e-9);
        assert_eq!(next.previous_error, 0.5);
    }

    #[test]
    fn output_is_clamped_symmetrically() {
        let pid = PidController::new(100.0, 0.0, 0.0, 2.0).unwrap();
        let (_, up) = pid.update(&PidState::default(), 0.0, 1.0, DT);
        assert_eq!(up.command, 2.0);
        assert!(up.saturated);
        assert_eq!(up.raw_command, 100.0);

        let (_, down) = pid.update(&PidState::default(), 2.0, 1.0, DT);
        assert_eq!(down.command, -2.0);
        assert!(down.saturated);
    }

    #[test]
    fn anti_windup_undoes_accumulation_when_saturated() {
        let pid = PidController::new(100.0, 1.0, 0.0, 1.0).unwrap();
        let state = PidState {
            error_integral: 2.0,
            previous_error: 0.0,
        };
        let (next, out) = pid.update(&state, 0.0, 1.0, DT);
        assert!(out.saturated);
        assert_eq!(next.error_integral, 2.0);
        // The integral term still saw the accumulated value.
        assert!((out.i_term - 3.0 * DT).abs() < 1e-12);

        let (next, _) = pid.clone().with_anti_windup(false).update(&state, 0.0, 1.0, DT);
        assert_eq!(next.error_integral, 3.0);
    }

    #[test]
    fn anti_windup_inactive_when_not_saturated() {
        let pid = PidController::new(1.0, 1.0, 0.0, 10.0).unwrap();
        let (next, out) = pid.update(&PidState::default(), 0.0, 1.0, DT);
        assert!(!out.saturated);
        assert_eq!(next.error_integral, 1.0);
    }

    #[test]
    fn previous_error_updates_even_when_saturated() {
        let pid = PidController::new(0.0, 0.0, 10.0, 0.5).unwrap();
        let (next, out) = pid.update(&PidState::default(), 0.0, 1.0, DT);
        assert!(out.saturated);
        assert_eq!(next.previous_error, 1.0);
    }

    #[test]
    fn zero_gains_produce_zero_command() {
        let pid = PidController::new(0.0, 0.0, 0.0, 1.0).unwrap();
        let (next, out) = pid.update(&PidState::default(), 0.0, 1.0, DT);
        assert_eq!(out.command, 0.0);
        assert!(!out.saturated);
        assert_eq!(next.error_integral, 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn command_never_exceeds_limit(
            kp in 0.0_f64..50.0,
            ki in 0.0_f64..20.0,
            kd in 0.0_f64..30.0,
            limit in 0.1_f64..10.0,
            measured in -10.0_f64..10.0,
            integral in -1000.0_f64..1000.0,
            previous in -10.0_f64..10.0,
        ) {
            let pid = PidController::new(kp, ki, kd, limit).unwrap();
            let state = PidState { error_integral: integral, previous_error: previous };
            let (_, out) = pid.update(&state, measured, 1.0, 0.01);
            prop_assert!(out.command.abs() <= limit + 1e-12);
            prop_assert_eq!(out.saturated, out.raw_command.abs() > limit);
        }
    }
}
