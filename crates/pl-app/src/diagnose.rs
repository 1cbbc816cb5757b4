//! Troubleshooting matrix: observed response problems and their usual fix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::LoopMetrics;

/// Response problem recognizable from loop metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    HighOvershoot,
    SteadyStateError,
    ActuatorJitter,
    Divergence,
}

impl Observation {
    pub const ALL: [Observation; 4] = [
        Observation::HighOvershoot,
        Observation::SteadyStateError,
        Observation::ActuatorJitter,
        Observation::Divergence,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Observation::HighOvershoot => "High overshoot",
            Observation::SteadyStateError => "Steady-state error",
            Observation::ActuatorJitter => "Actuator jitter",
            Observation::Divergence => "Divergence",
        }
    }

    /// Usual corrective action.
    pub fn correction(&self) -> &'static str {
        match self {
            Observation::HighOvershoot => "Increase Kd",
            Observation::SteadyStateError => "Increase Ki",
            Observation::ActuatorJitter => "Filter sensor noise",
            Observation::Divergence => "Check anti-windup",
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected problem with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub observation: Observation,
    pub detail: String,
}

impl Finding {
    pub fn correction(&self) -> &'static str {
        self.observation.correction()
    }
}

/// Limits beyond which an observation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisThresholds {
    /// Overshoot in percent of the step
    pub overshoot_pct: f64,
    /// Final error as a fraction of the step
    pub steady_state_fraction: f64,
    /// Percentage of ticks with a command sign change
    pub reversal_pct: f64,
    /// Late peak-to-peak amplitude as a fraction of the step
    pub late_oscillation_fraction: f64,
}

impl Default for DiagnosisThresholds {
    fn default() -> Self {
        Self {
            overshoot_pct: 10.0,
            steady_state_fraction: 0.02,
            reversal_pct: 10.0,
            late_oscillation_fraction: 0.5,
        }
    }
}

/// Match metrics against the troubleshooting matrix.
pub fn diagnose(metrics: &LoopMetrics, thresholds: &DiagnosisThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(step) = metrics.step.map(f64::abs).filter(|s| *s > 1e-9) else {
        return findings;
    };

    if !metrics.finite {
        findings.push(Finding {
            observation: Observation::Divergence,
            detail: "response became non-finite".to_string(),
        });
        return findings;
    }

    let sse = metrics.steady_state_error.unwrap_or(0.0);
    let late = metrics.late_peak_to_peak.unwrap_or(0.0);
    if sse.abs() > step || late > thresholds.late_oscillation_fraction * step {
        findings.push(Finding {
            observation: Observation::Divergence,
            detail: format!(
                "final error {sse:.3} and late peak-to-peak {late:.3} for a step of {step:.3}"
            ),
        });
    }

    if let Some(pct) = metrics.overshoot_pct {
        if pct > thresholds.overshoot_pct {
            findings.push(Finding {
                observation: Observation::HighOvershoot,
                detail: format!("overshoot {pct:.1}% exceeds {:.1}%", thresholds.overshoot_pct),
            });
        }
    }

    if sse.abs() > thresholds.steady_state_fraction * step {
        findings.push(Finding {
            observation: Observation::SteadyStateError,
            detail: format!("final error {sse:.4}"),
        });
    }

    if let Some(pct) = metrics.command_reversal_pct {
        if pct > thresholds.reversal_pct {
            findings.push(Finding {
                observation: Observation::ActuatorJitter,
                detail: format!("command changed sign on {pct:.1}% of ticks"),
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> LoopMetrics {
        LoopMetrics {
            step: Some(1.0),
            overshoot_pct: Some(5.0),
            steady_state_error: Some(0.001),
            command_reversal_pct: Some(0.1),
            late_peak_to_peak: Some(0.01),
            finite: true,
            ..LoopMetrics::default()
        }
    }

    fn observations(m: &LoopMetrics) -> Vec<Observation> {
        diagnose(m, &DiagnosisThresholds::default())
            .into_iter()
            .map(|f| f.observation)
            .collect()
    }

    #[test]
    fn well_tuned_response_has_no_findings() {
        assert!(observations(&clean()).is_empty());
    }

    #[test]
    fn each_observation_maps_to_its_correction() {
        let overshoot = LoopMetrics {
            overshoot_pct: Some(30.0),
            ..clean()
        };
        assert_eq!(observations(&overshoot), vec![Observation::HighOvershoot]);

        let sse = LoopMetrics {
            steady_state_error: Some(0.1),
            ..clean()
        };
        assert_eq!(observations(&sse), vec![Observation::SteadyStateError]);

        let jitter = LoopMetrics {
            command_reversal_pct: Some(45.0),
            ..clean()
        };
        let findings = diagnose(&jitter, &DiagnosisThresholds::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].correction(), "Filter sensor noise");
    }

    #[test]
    fn non_finite_response_is_divergence_only() {
        let m = LoopMetrics {
            finite: false,
            overshoot_pct: Some(500.0),
            ..clean()
        };
        let findings = diagnose(&m, &DiagnosisThresholds::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].observation, Observation::Divergence);
        assert_eq!(findings[0].correction(), "Check anti-windup");
    }

    #[test]
    fn sustained_oscillation_is_divergence() {
        let m = LoopMetrics {
            late_peak_to_peak: Some(2.0),
            ..clean()
        };
        assert!(observations(&m).contains(&Observation::Divergence));
    }

    #[test]
    fn no_step_means_nothing_to_judge() {
        let m = LoopMetrics {
            step: Some(0.0),
            ..clean()
        };
        assert!(observations(&m).is_empty());
    }

    #[test]
    fn matrix_covers_every_observation() {
        let corrections: Vec<&str> = Observation::ALL.iter().map(|o| o.correction()).collect();
        assert_eq!(
            corrections,
            vec![
                "Increase Kd",
                "Increase Ki",
                "Filter sensor noise",
                "Check anti-windup"
            ]
        );
    }
}
