//! Step response performance metrics.
//!
//! Computes standard control metrics (rise time, settling time, overshoot,
//! steady-state error) plus actuator and integrator statistics from a
//! completed simulation run.

use pl_sim::{PlantState, SampleRecord, SimulationResult};
use serde::{Deserialize, Serialize};

/// Analysis settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsOptions {
    /// Settling band as a fraction of the step size
    pub settling_band: f64,
    /// Start of the window used for late oscillation amplitude (seconds)
    pub late_window_start_s: f64,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            settling_band: 0.02,
            late_window_start_s: 5.0,
        }
    }
}

/// Step response metrics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoopMetrics {
    /// Reference minus the rest position the run started from
    pub step: Option<f64>,
    /// Time for position to cover 10% of the step (seconds)
    pub rise_time_10_s: Option<f64>,
    /// Time for position to cover 90% of the step (seconds)
    pub rise_time_90_s: Option<f64>,
    /// Time after which position stays inside the settling band (seconds)
    pub settling_time_s: Option<f64>,
    /// Peak excursion past the reference, in position units
    pub overshoot: Option<f64>,
    /// Overshoot in percent of the step
    pub overshoot_pct: Option<f64>,
    /// Reference minus final position
    pub steady_state_error: Option<f64>,
    pub max_abs_command: Option<f64>,
    /// Percentage of ticks with the actuator saturated
    pub saturation_pct: Option<f64>,
    pub max_abs_error_integral: Option<f64>,
    /// Percentage of ticks where the command changed sign
    pub command_reversal_pct: Option<f64>,
    /// Peak-to-peak position inside the late window
    pub late_peak_to_peak: Option<f64>,
    /// False if any recorded state, measurement or command went NaN or infinite
    pub finite: bool,
}

impl LoopMetrics {
    /// Returns true if at least the step metrics were computed
    pub fn has_data(&self) -> bool {
        self.steady_state_error.is_some()
    }
}

/// Compute metrics for a completed run.
pub fn compute_loop_metrics(result: &SimulationResult, opts: &MetricsOptions) -> LoopMetrics {
    let samples = &result.samples;
    let Some(last) = samples.last() else {
        return LoopMetrics {
            finite: true,
            ..LoopMetrics::default()
        };
    };

    // Samples hold post-step states; every run starts from rest.
    let initial = PlantState::default().position;
    let reference = result.reference();
    let step = reference - initial;

    let mut metrics = LoopMetrics {
        step: Some(step),
        steady_state_error: Some(reference - last.position),
        finite: samples.iter().all(sample_is_finite),
        ..LoopMetrics::default()
    };

    metrics.max_abs_command = max_abs(samples.iter().map(|s| s.command));
    metrics.max_abs_error_integral = max_abs(samples.iter().map(|s| s.error_integral));
    let saturated = samples.iter().filter(|s| s.saturated).count();
    metrics.saturation_pct = Some(100.0 * saturated as f64 / samples.len() as f64);
    metrics.command_reversal_pct = compute_reversal_pct(samples);
    metrics.late_peak_to_peak = compute_peak_to_peak(samples, opts.late_window_start_s);

    if step.abs() > 1e-9 {
        metrics.rise_time_10_s = compute_time_to_fraction(samples, initial, step, 0.1);
        metrics.rise_time_90_s = compute_time_to_fraction(samples, initial, step, 0.9);

        // Excursion past the reference in the direction of the step.
        let excursion = samples
            .iter()
            .map(|s| (s.position - reference) * step.signum())
            .fold(f64::NEG_INFINITY, f64::max);
        let overshoot = excursion.max(0.0);
        metrics.overshoot = Some(overshoot);
        metrics.overshoot_pct = Some(100.0 * overshoot / step.abs());

        metrics.settling_time_s =
            compute_settling_time(samples, reference, opts.settling_band * step.abs());
    }

    metrics
}

fn sample_is_finite(s: &SampleRecord) -> bool {
    [
        s.position,
        s.velocity,
        s.measured,
        s.command,
        s.error,
        s.error_integral,
    ]
    .iter()
    .all(|v| v.is_finite())
}

fn max_abs(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.map(f64::abs).reduce(f64::max)
}

/// Time at which position first covers `fraction` of the step.
/// Linearly interpolated between the bracketing samples.
fn compute_time_to_fraction(
    samples: &[SampleRecord],
    initial: f64,
    step: f64,
    fraction: f64,
) -> Option<f64> {
    let target = initial + fraction * step;
    let reached = |v: f64| if step > 0.0 { v >= target } else { v <= target };

    for (i, s) in samples.iter().enumerate() {
        if !reached(s.position) {
            continue;
        }
        if i == 0 {
            return Some(s.time);
        }
        let prev = &samples[i - 1];
        let delta_v = s.position - prev.position;
        if delta_v.abs() > 1e-12 {
            let frac = (target - prev.position) / delta_v;
            return Some(prev.time + frac * (s.time - prev.time));
        }
        return Some(s.time);
    }
    None
}

/// Time of the first sample after which position stays strictly within
/// `half_width` of the reference.
fn compute_settling_time(samples: &[SampleRecord], reference: f64, half_width: f64) -> Option<f64> {
    let outside = |s: &SampleRecord| !((s.position - reference).abs() < half_width);
    match samples.iter().rposition(outside) {
        None => samples.first().map(|s| s.time),
        Some(idx) => samples.get(idx + 1).map(|s| s.time),
    }
}

fn compute_reversal_pct(samples: &[SampleRecord]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let reversals = samples
        .windows(2)
        .filter(|w| w[0].command * w[1].command < 0.0)
        .count();
    Some(100.0 * reversals as f64 / (samples.len() - 1) as f64)
}

fn compute_peak_to_peak(samples: &[SampleRecord], from_s: f64) -> Option<f64> {
    let (lo, hi) = samples
        .iter()
        .filter(|s| s.time >= from_s)
        .map(|s| s.position)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    Some(hi - lo)
}
