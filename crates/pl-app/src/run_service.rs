//! Run execution service: validate, simulate, analyze.

use std::time::Instant;

use pl_sim::{SimProgress, SimulationConfig, SimulationEngine, SimulationResult};

use crate::diagnose::{DiagnosisThresholds, Finding, diagnose};
use crate::error::AppResult;
use crate::metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};

/// Request to execute a run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub config: SimulationConfig,
    /// Noise seed; `None` draws one from entropy
    pub seed: Option<u64>,
    pub metrics: MetricsOptions,
    pub thresholds: DiagnosisThresholds,
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub setup_time_s: f64,
    pub simulate_time_s: f64,
    pub analyze_time_s: f64,
    pub total_time_s: f64,
}

/// Result of executing a run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub result: SimulationResult,
    pub metrics: LoopMetrics,
    pub findings: Vec<Finding>,
    pub timing: RunTimingSummary,
}

pub fn execute(request: &RunRequest) -> AppResult<RunResponse> {
    execute_with_progress(request, None)
}

/// Execute a run, reporting engine progress roughly every percent.
pub fn execute_with_progress(
    request: &RunRequest,
    progress: Option<&mut dyn FnMut(&SimProgress)>,
) -> AppResult<RunResponse> {
    let total_start = Instant::now();

    let setup_start = Instant::now();
    let engine = match request.seed {
        Some(seed) => SimulationEngine::seeded(request.config.clone(), seed)?,
        None => SimulationEngine::from_entropy(request.config.clone())?,
    };
    let every = (engine.tick_count() / 100).max(1);
    let setup_time_s = setup_start.elapsed().as_secs_f64();

    let sim_start = Instant::now();
    let result = engine.run_with_progress(every, progress);
    let simulate_time_s = sim_start.elapsed().as_secs_f64();

    let analyze_start = Instant::now();
    let metrics = compute_loop_metrics(&result, &request.metrics);
    let findings = diagnose(&metrics, &request.thresholds);
    let analyze_time_s = analyze_start.elapsed().as_secs_f64();

    tracing::debug!(
        samples = result.len(),
        findings = findings.len(),
        "run finished"
    );

    Ok(RunResponse {
        result,
        metrics,
        findings,
        timing: RunTimingSummary {
            setup_time_s,
            simulate_time_s,
            analyze_time_s,
            total_time_s: total_start.elapsed().as_secs_f64(),
        },
    })
}
