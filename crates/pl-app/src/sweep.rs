//! Parameter sweeps: one parameter varied over a range, points run in parallel.
//!
//! Every point gets its own engine and noise generator (seeded
//! `base_seed + index` when a base seed is given), so points are independent
//! and the sweep is reproducible regardless of thread scheduling.

use std::fmt;
use std::str::FromStr;

use pl_sim::{SimulationConfig, SimulationEngine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};

/// Configuration field varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    Kp,
    Ki,
    Kd,
    Inertia,
    SaturationLimit,
    NoiseLevel,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 6] = [
        SweepParameter::Kp,
        SweepParameter::Ki,
        SweepParameter::Kd,
        SweepParameter::Inertia,
        SweepParameter::SaturationLimit,
        SweepParameter::NoiseLevel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SweepParameter::Kp => "kp",
            SweepParameter::Ki => "ki",
            SweepParameter::Kd => "kd",
            SweepParameter::Inertia => "inertia",
            SweepParameter::SaturationLimit => "saturation_limit",
            SweepParameter::NoiseLevel => "noise_level",
        }
    }

    /// Copy of `base` with this parameter set to `value`.
    pub fn apply(&self, base: &SimulationConfig, value: f64) -> SimulationConfig {
        let mut config = base.clone();
        match self {
            SweepParameter::Kp => config.kp = value,
            SweepParameter::Ki => config.ki = value,
            SweepParameter::Kd => config.kd = value,
            SweepParameter::Inertia => config.inertia = value,
            SweepParameter::SaturationLimit => config.saturation_limit = value,
            SweepParameter::NoiseLevel => config.noise_level = value,
        }
        config
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepParameter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SweepParameter::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown sweep parameter '{s}'")))
    }
}

/// Inclusive linear range for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    pub parameter: SweepParameter,
    pub start: f64,
    pub end: f64,
    /// Number of points, including both ends
    pub points: usize,
}

impl SweepDefinition {
    pub fn new(parameter: SweepParameter, start: f64, end: f64, points: usize) -> AppResult<Self> {
        if points == 0 {
            return Err(AppError::InvalidInput(
                "sweep needs at least one point".to_string(),
            ));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(AppError::InvalidInput(
                "sweep bounds must be finite".to_string(),
            ));
        }
        Ok(Self {
            parameter,
            start,
            end,
            points,
        })
    }

    /// Evenly spaced values from `start` to `end`.
    pub fn values(&self) -> Vec<f64> {
        if self.points == 1 {
            return vec![self.start];
        }
        let span = self.end - self.start;
        let last = (self.points - 1) as f64;
        (0..self.points)
            .map(|i| self.start + span * i as f64 / last)
            .collect()
    }
}

/// Outcome of one sweep point. Exactly one of `metrics` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub seed: Option<u64>,
    pub metrics: Option<LoopMetrics>,
    pub error: Option<String>,
}

/// All points of a sweep, in range order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter: SweepParameter,
    pub points: Vec<SweepPoint>,
    pub num_successful: usize,
    pub num_failed: usize,
}

impl SweepResult {
    /// `(value, metrics)` for points that ran.
    pub fn successful(&self) -> impl Iterator<Item = (f64, &LoopMetrics)> {
        self.points
            .iter()
            .filter_map(|p| p.metrics.as_ref().map(|m| (p.value, m)))
    }
}

/// Run every point of `definition` on top of `base`, in parallel.
///
/// Points whose configuration is rejected are reported per point; they do
/// not abort the sweep.
pub fn run_sweep(
    base: &SimulationConfig,
    definition: &SweepDefinition,
    base_seed: Option<u64>,
    opts: &MetricsOptions,
) -> SweepResult {
    let values = definition.values();
    tracing::info!(
        parameter = %definition.parameter,
        points = values.len(),
        "running sweep"
    );

    let points: Vec<SweepPoint> = values
        .par_iter()
        .enumerate()
        .map(|(index, &value)| {
            let config = definition.parameter.apply(base, value);
            let seed = base_seed.map(|s| s.wrapping_add(index as u64));
            let engine = match seed {
                Some(seed) => SimulationEngine::seeded(config, seed),
                None => SimulationEngine::from_entropy(config),
            };
            match engine {
                Ok(engine) => {
                    let result = engine.run();
                    SweepPoint {
                        value,
                        seed,
                        metrics: Some(compute_loop_metrics(&result, opts)),
                        error: None,
                    }
                }
                Err(e) => SweepPoint {
                    value,
                    seed,
                    metrics: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let num_failed = points.iter().filter(|p| p.error.is_some()).count();
    if num_failed > 0 {
        tracing::warn!(num_failed, "some sweep points were rejected");
    }

    SweepResult {
        parameter: definition.parameter,
        num_successful: points.len() - num_failed,
        num_failed,
        points,
    }
}
