//! Integration test: parallel parameter sweeps.

use pl_app::{MetricsOptions, SweepDefinition, SweepParameter, run_sweep};
use pl_sim::SimulationConfig;

fn quiet() -> SimulationConfig {
    SimulationConfig {
        noise_level: 0.0,
        total_time: 10.0,
        ..SimulationConfig::default()
    }
}

#[test]
fn derivative_gain_reduces_overshoot() {
    let def = SweepDefinition::new(SweepParameter::Kd, 0.0, 10.0, 3).unwrap();
    let sweep = run_sweep(&quiet(), &def, None, &MetricsOptions::default());

    assert_eq!(sweep.num_successful, 3);
    let overshoots: Vec<f64> = sweep
        .successful()
        .map(|(_, m)| m.overshoot.unwrap())
        .collect();
    assert!(overshoots[0] > overshoots[2], "{overshoots:?}");
}

#[test]
fn points_come_back_in_range_order() {
    let def = SweepDefinition::new(SweepParameter::Kp, 1.0, 20.0, 8).unwrap();
    let sweep = run_sweep(&quiet(), &def, Some(5), &MetricsOptions::default());
    let values: Vec<f64> = sweep.points.iter().map(|p| p.value).collect();
    assert_eq!(values, def.values());
    let seeds: Vec<Option<u64>> = sweep.points.iter().map(|p| p.seed).collect();
    assert_eq!(seeds, (5..13).map(Some).collect::<Vec<_>>());
}

#[test]
fn seeded_noisy_sweep_is_reproducible() {
    let base = SimulationConfig {
        total_time: 5.0,
        ..SimulationConfig::default()
    };
    let def = SweepDefinition::new(SweepParameter::NoiseLevel, 0.0, 0.05, 4).unwrap();
    let a = run_sweep(&base, &def, Some(42), &MetricsOptions::default());
    let b = run_sweep(&base, &def, Some(42), &MetricsOptions::default());
    assert_eq!(a, b);
}

#[test]
fn rejected_points_do_not_abort_sweep() {
    let def = SweepDefinition::new(SweepParameter::Inertia, 0.0, 2.0, 3).unwrap();
    let sweep = run_sweep(&quiet(), &def, None, &MetricsOptions::default());
    assert_eq!(sweep.num_failed, 1);
    assert_eq!(sweep.num_successful, 2);
    let failed = &sweep.points[0];
    assert!(failed.metrics.is_none());
    assert!(failed.error.as_deref().unwrap().contains("inertia"));
}
