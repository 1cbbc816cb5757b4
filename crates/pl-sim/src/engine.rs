//! Fixed-step closed-loop simulation engine.
//!
//! A run moves through three phases:
//!
//! - **Idle**: configuration validated, nothing simulated yet
//! - **Running**: ticks `0..tick_count` being executed
//! - **Complete**: all ticks recorded, result available
//!
//! Each tick reads the plant state, corrupts it with measurement noise, runs
//! the controller, advances the plant and records a sample holding the
//! measurement and command of the tick with the plant state it produced.
//! Plant and controller states are plain values replaced once per tick.

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::noise::{GaussianNoise, NoiseSource};
use crate::plant::{PlantState, RigidBodyPlant};
use crate::record::{SampleRecord, SimulationResult};
use pl_controls::{PidController, PidState};

/// Lifecycle of a [`SimulationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Running,
    Complete,
}

/// Progress snapshot passed to run observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    /// Ticks executed so far
    pub tick: usize,
    pub tick_count: usize,
    /// Simulated time reached (seconds)
    pub sim_time: f64,
    pub fraction_complete: f64,
}

/// Controller, plant and timing shared by every tick of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedLoop {
    pub controller: PidController,
    pub plant: RigidBodyPlant,
    pub reference: f64,
    pub time_step: f64,
}

/// States after one tick plus the recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub plant: PlantState,
    pub controller: PidState,
    pub sample: SampleRecord,
}

impl ClosedLoop {
    pub fn from_config(config: &SimulationConfig) -> SimResult<Self> {
        Ok(Self {
            controller: config.controller()?,
            plant: RigidBodyPlant::new(config.inertia)?,
            reference: config.reference,
            time_step: config.time_step,
        })
    }

    /// Execute tick `index` from the given states with a pre-drawn noise value.
    pub fn tick(
        &self,
        index: usize,
        plant: &PlantState,
        controller: &PidState,
        noise: f64,
    ) -> TickOutcome {
        let time = index as f64 * self.time_step;
        let measured = plant.position + noise;

        let (next_controller, output) =
            self.controller.update(controller, measured, self.reference, self.time_step);
        let next_plant = self.plant.step(plant, output.command, self.time_step);

        TickOutcome {
            plant: next_plant,
            controller: next_controller,
            sample: SampleRecord {
                time,
                position: next_plant.position,
                velocity: next_plant.velocity,
                measured,
                command: output.command,
                error: output.error,
                error_integral: next_controller.error_integral,
                saturated: output.saturated,
            },
        }
    }
}

/// Owns all mutable state of one simulation run.
pub struct SimulationEngine<N: NoiseSource> {
    config: SimulationConfig,
    closed_loop: ClosedLoop,
    noise: N,
    tick_count: usize,
    phase: EnginePhase,
    next_tick: usize,
    plant_state: PlantState,
    controller_state: PidState,
    samples: Vec<SampleRecord>,
}

impl SimulationEngine<GaussianNoise> {
    /// Engine with a reproducible noise stream.
    pub fn seeded(config: SimulationConfig, seed: u64) -> SimResult<Self> {
        Self::new(config, GaussianNoise::seeded(seed))
    }

    /// Engine with an entropy-seeded noise stream.
    pub fn from_entropy(config: SimulationConfig) -> SimResult<Self> {
        Self::new(config, GaussianNoise::from_entropy())
    }
}

impl<N: NoiseSource> SimulationEngine<N> {
    /// Validate the configuration and prepare an idle engine.
    pub fn new(config: SimulationConfig, noise: N) -> SimResult<Self> {
        let tick_count = config.tick_count()?;
        let closed_loop = ClosedLoop::from_config(&config)?;
        Ok(Self {
            config,
            closed_loop,
            noise,
            tick_count,
            phase: EnginePhase::Idle,
            next_tick: 0,
            plant_state: PlantState::default(),
            controller_state: PidState::default(),
            samples: Vec::new(),
        })
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// Number of ticks executed so far.
    pub fn ticks_done(&self) -> usize {
        self.next_tick
    }

    pub fn plant_state(&self) -> &PlantState {
        &self.plant_state
    }

    pub fn controller_state(&self) -> &PidState {
        &self.controller_state
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    fn start(&mut self) {
        self.plant_state = PlantState::default();
        self.controller_state = PidState::default();
        self.samples = Vec::with_capacity(self.tick_count);
        self.next_tick = 0;
        self.phase = EnginePhase::Running;
        tracing::debug!(
            tick_count = self.tick_count,
            time_step = self.config.time_step,
            noise_level = self.config.noise_level,
            "simulation started"
        );
    }

    fn finish(&mut self) {
        self.phase = EnginePhase::Complete;
        match self.samples.last() {
            Some(last) if !last.position.is_finite() => {
                tracing::warn!(time = last.time, "response is non-finite at end of run");
            }
            Some(last) => {
                tracing::debug!(final_position = last.position, "simulation complete");
            }
            None => tracing::debug!("simulation complete with no ticks"),
        }
    }

    /// Execute one tick, starting the run if idle.
    ///
    /// Returns `None` once the run is complete.
    pub fn step(&mut self) -> Option<SampleRecord> {
        match self.phase {
            EnginePhase::Complete => return None,
            EnginePhase::Idle => self.start(),
            EnginePhase::Running => {}
        }

        if self.next_tick >= self.tick_count {
            self.finish();
            return None;
        }

        let noise = self.noise.sample(self.config.noise_level);
        let outcome = self.closed_loop.tick(
            self.next_tick,
            &self.plant_state,
            &self.controller_state,
            noise,
        );
        self.plant_state = outcome.plant;
        self.controller_state = outcome.controller;
        self.samples.push(outcome.sample);
        self.next_tick += 1;

        if self.next_tick == self.tick_count {
            self.finish();
        }
        Some(outcome.sample)
    }

    /// Run every remaining tick and return the result.
    pub fn run(self) -> SimulationResult {
        self.run_with_progress(usize::MAX, None)
    }

    /// Run to completion, reporting progress every `every` ticks.
    pub fn run_with_progress(
        mut self,
        every: usize,
        mut progress: Option<&mut dyn FnMut(&SimProgress)>,
    ) -> SimulationResult {
        let every = every.max(1);
        while self.step().is_some() {
            if let Some(cb) = progress.as_deref_mut() {
                if self.next_tick % every == 0 || self.phase == EnginePhase::Complete {
                    cb(&self.progress());
                }
            }
        }
        SimulationResult {
            seed: self.noise.seed(),
            config: self.config,
            samples: self.samples,
        }
    }

    pub fn progress(&self) -> SimProgress {
        let fraction_complete = if self.tick_count == 0 {
            1.0
        } else {
            self.next_tick as f64 / self.tick_count as f64
        };
        SimProgress {
            tick: self.next_tick,
            tick_count: self.tick_count,
            sim_time: self.next_tick as f64 * self.config.time_step,
            fraction_complete,
        }
    }

    /// Hand over the result of a completed run.
    pub fn into_result(self) -> SimResult<SimulationResult> {
        if self.phase != EnginePhase::Complete {
            return Err(SimError::State {
                what: "run has not completed",
            });
        }
        Ok(SimulationResult {
            seed: self.noise.seed(),
            config: self.config,
            samples: self.samples,
        })
    }
}

/// Validate `config` and run one simulation.
///
/// `seed` selects a reproducible noise stream; `None` draws from entropy.
pub fn simulate(config: &SimulationConfig, seed: Option<u64>) -> SimResult<SimulationResult> {
    let result = match seed {
        Some(seed) => SimulationEngine::seeded(config.clone(), seed)?.run(),
        None => SimulationEngine::from_entropy(config.clone())?.run(),
    };
    Ok(result)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn commands_respect_saturation(
            kp in 0.0_f64..50.0,
            ki in 0.0_f64..20.0,
            kd in 0.0_f64..30.0,
            limit in 0.1_f64..10.0,
            noise in 0.0_f64..0.1,
            seed in any::<u64>(),
        ) {
            let config = SimulationConfig {
                kp,
                ki,
                kd,
                saturation_limit: limit,
                noise_level: noise,
                total_time: 2.0,
                ..SimulationConfig::default()
            };
            let result = SimulationEngine::seeded(config, seed).unwrap().run();
            prop_assert_eq!(result.len(), 200);
            for s in &result.samples {
                prop_assert!(s.command.abs() <= limit + 1e-12);
            }
        }

        #[test]
        fn unforced_plant_never_moves(seed in any::<u64>(), noise in 0.0_f64..0.1) {
            let config = SimulationConfig {
                kp: 0.0,
                ki: 0.0,
                kd: 0.0,
                noise_level: noise,
                total_time: 1.0,
                ..SimulationConfig::default()
            };
            let result = SimulationEngine::seeded(config, seed).unwrap().run();
            for s in &result.samples {
                prop_assert_eq!(s.command, 0.0);
                prop_assert_eq!(s.position, 0.0);
            }
        }
    }
}
