//! Integration test: configuration files on disk.

use std::path::PathBuf;

use pl_app::{AppError, load_config, save_config};
use pl_sim::SimulationConfig;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pl-app-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn yaml_and_json_files_roundtrip() {
    let config = SimulationConfig {
        kp: 20.0,
        noise_level: 0.0,
        ..SimulationConfig::default()
    };
    for name in ["cfg.yaml", "cfg.json"] {
        let path = scratch(name);
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}

#[test]
fn invalid_config_is_not_saved() {
    let path = scratch("bad.yaml");
    let _ = std::fs::remove_file(&path);
    let config = SimulationConfig {
        saturation_limit: -1.0,
        ..SimulationConfig::default()
    };
    assert!(matches!(save_config(&path, &config), Err(AppError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn missing_file_reports_path() {
    let path = scratch("does-not-exist.yaml");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigFileRead { .. }));
    assert!(err.to_string().contains("does-not-exist.yaml"));
}

#[test]
fn hand_written_yaml_loads() {
    let path = scratch("hand.yml");
    std::fs::write(
        &path,
        "inertia: 2.0\nkp: 10.0\nanti_windup_enabled: false\ntotal_time: 5.0\n",
    )
    .unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.inertia, 2.0);
    assert!(!config.anti_windup_enabled);
    assert_eq!(config.tick_count().unwrap(), 500);
}
