//! Shared application service layer for pitchloop.
//!
//! This crate provides a unified interface for frontends, centralizing
//! configuration files, run execution, response analysis, parameter sweeps
//! and result export.

pub mod config_service;
pub mod diagnose;
pub mod error;
pub mod export;
pub mod metrics;
pub mod run_service;
pub mod sweep;

// Re-export key types for convenience
pub use config_service::{
    ConfigFormat, ConfigOverrides, load_config, parse_config_str, save_config, to_config_string,
};
pub use diagnose::{DiagnosisThresholds, Finding, Observation, diagnose};
pub use error::{AppError, AppResult};
pub use export::{ExportFormat, to_csv, to_json, write_result};
pub use metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};
pub use run_service::{RunRequest, RunResponse, RunTimingSummary, execute, execute_with_progress};
pub use sweep::{SweepDefinition, SweepParameter, SweepPoint, SweepResult, run_sweep};
