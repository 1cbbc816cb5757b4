//! Closed-loop attitude simulation for pitchloop.
//!
//! Provides:
//! - Double-integrator rigid-body plant with fixed-step integration
//! - Seedable Gaussian measurement noise, owned per run
//! - Validated simulation configuration
//! - Simulation engine (Idle → Running → Complete) producing a sample series

pub mod config;
pub mod engine;
pub mod error;
pub mod noise;
pub mod plant;
pub mod record;

// Re-exports for public API
pub use config::{MAX_TICK_COUNT, SimulationConfig};
pub use engine::{ClosedLoop, EnginePhase, SimProgress, SimulationEngine, TickOutcome, simulate};
pub use error::{ConfigError, SimError, SimResult};
pub use noise::{GaussianNoise, NoNoise, NoiseSource};
pub use plant::{PlantState, RigidBodyPlant, integrate};
pub use record::{SampleRecord, SimulationResult, Variable};
pub use pl_controls::{PidController, PidOutput, PidState};
