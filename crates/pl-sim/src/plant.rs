//! Rigid-body rotational plant (double integrator).

use crate::error::SimResult;
use pl_core::ensure_positive;
use serde::{Deserialize, Serialize};

/// Angular state of the rigid body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Angle (rad), e.g. pitch
    pub position: f64,
    /// Angular rate (rad/s)
    pub velocity: f64,
}

/// Advance the double integrator by one step.
///
/// `acceleration = torque / inertia`, the velocity is updated first and the
/// position moves with the updated velocity. Explicit fixed-step scheme: stable
/// for bounded torque and small `dt` only.
pub fn integrate(state: &PlantState, torque: f64, inertia: f64, dt: f64) -> PlantState {
    let acceleration = torque / inertia;
    let velocity = state.velocity + acceleration * dt;
    let position = state.position + velocity * dt;
    PlantState { position, velocity }
}

/// Double-integrator plant with validated inertia.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyPlant {
    /// Rotational inertia (kg·m²), always positive
    inertia: f64,
}

impl RigidBodyPlant {
    /// Create a plant; inertia must be finite and positive.
    pub fn new(inertia: f64) -> SimResult<Self> {
        let inertia = ensure_positive(inertia, "inertia")?;
        Ok(Self { inertia })
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Advance state by dt under the applied torque.
    pub fn step(&self, state: &PlantState, torque: f64, dt: f64) -> PlantState {
        integrate(state, torque, self.inertia, dt)
    }
}
