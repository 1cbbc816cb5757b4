//! Discrete feedback controllers for pitchloop.
//!
//! The controller operates in sampled mode: it is called once per simulation
//! tick with the measured position and returns a torque command together with
//! its next state. State is an explicit value record so every tick's
//! transition can be inspected in isolation.
//!
//! The PID law includes:
//! - Symmetric output saturation
//! - Conditional anti-windup (undo of the current tick's accumulation)
//! - Backward-difference derivative on the error

pub mod controller;
pub mod error;

pub use controller::{PidController, PidOutput, PidState};
pub use error::{ControlError, ControlResult};
