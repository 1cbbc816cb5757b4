//! Writing run results for external plotting tools.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use pl_sim::SimulationResult;

use crate::error::{AppError, AppResult};

pub const CSV_HEADER: &str =
    "time_s,position,velocity,measured,command,error,error_integral,saturated";

/// Sample export encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// One row per sample, header first.
pub fn to_csv(result: &SimulationResult) -> String {
    let mut csv = String::with_capacity(64 * (result.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for s in &result.samples {
        // Writing to a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{}",
            s.time,
            s.position,
            s.velocity,
            s.measured,
            s.command,
            s.error,
            s.error_integral,
            s.saturated
        );
    }
    csv
}

/// Whole result, configuration included.
pub fn to_json(result: &SimulationResult) -> AppResult<String> {
    serde_json::to_string_pretty(result).map_err(|e| AppError::Serialization(e.to_string()))
}

pub fn write_result(path: &Path, result: &SimulationResult, format: ExportFormat) -> AppResult<()> {
    let content = match format {
        ExportFormat::Csv => to_csv(result),
        ExportFormat::Json => to_json(result)?,
    };
    std::fs::write(path, content).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_sim::{SimulationConfig, simulate};

    fn short_run() -> SimulationResult {
        let config = SimulationConfig {
            noise_level: 0.0,
            total_time: 0.03,
            ..SimulationConfig::default()
        };
        simulate(&config, None).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let result = short_run();
        let csv = to_csv(&result);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), result.len() + 1);
        assert!(lines[1].starts_with("0,0.0002,0.02,0,2,1,0,true"));
    }

    #[test]
    fn json_carries_config_and_samples() {
        let result = short_run();
        let json = to_json(&result).unwrap();
        let back: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.config, result.config);
        assert_eq!(back.len(), result.len());
        for (a, b) in back.samples.iter().zip(&result.samples) {
            assert!((a.position - b.position).abs() <= 1e-12);
            assert_eq!(a.saturated, b.saturated);
        }
    }

    #[test]
    fn format_names() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
