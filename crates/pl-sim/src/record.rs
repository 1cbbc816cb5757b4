//! Per-tick samples and the time series handed to consumers.

use crate::config::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything observed during one tick.
///
/// `measured`, `error` and `command` are taken at `time`; `position` and
/// `velocity` are the plant state after the tick's integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// `tick * time_step` (seconds)
    pub time: f64,
    /// Plant angle after the step (rad)
    pub position: f64,
    /// Plant rate after the step (rad/s)
    pub velocity: f64,
    /// Position as seen by the controller, noise included
    pub measured: f64,
    /// Torque applied during this tick, after saturation
    pub command: f64,
    /// `reference - measured`
    pub error: f64,
    /// Controller error sum after this tick's update
    pub error_integral: f64,
    pub saturated: bool,
}

/// Scalar channels of a [`SampleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Position,
    Velocity,
    Measured,
    Command,
    Error,
    ErrorIntegral,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Position,
        Variable::Velocity,
        Variable::Measured,
        Variable::Command,
        Variable::Error,
        Variable::ErrorIntegral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Position => "position",
            Variable::Velocity => "velocity",
            Variable::Measured => "measured",
            Variable::Command => "command",
            Variable::Error => "error",
            Variable::ErrorIntegral => "error_integral",
        }
    }

    pub fn value(&self, sample: &SampleRecord) -> f64 {
        match self {
            Variable::Position => sample.position,
            Variable::Velocity => sample.velocity,
            Variable::Measured => sample.measured,
            Variable::Command => sample.command,
            Variable::Error => sample.error,
            Variable::ErrorIntegral => sample.error_integral,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .iter()
            .copied()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown variable '{s}'"))
    }
}

/// Ordered samples of one completed run; index is the tick number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Configuration that produced the samples
    pub config: SimulationConfig,
    /// Noise seed, when the run is reproducible by seed
    pub seed: Option<u64>,
    pub samples: Vec<SampleRecord>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Constant target line for plotting.
    pub fn reference(&self) -> f64 {
        self.config.reference
    }

    pub fn final_sample(&self) -> Option<&SampleRecord> {
        self.samples.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.position).collect()
    }

    pub fn commands(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.command).collect()
    }

    /// `(time, value)` pairs for one channel.
    pub fn series(&self, variable: Variable) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.time, variable.value(s)))
            .collect()
    }
}
