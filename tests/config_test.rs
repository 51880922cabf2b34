// Tests for config file loading and environment overrides

mod common;

use glacier_melt::config::{Config, ConfigError, ENV_DEGREE_DAY_FACTOR, ENV_OUTPUT_DIR};
use serial_test::serial;
use std::path::PathBuf;

fn clear_env() {
    std::env::remove_var(ENV_DEGREE_DAY_FACTOR);
    std::env::remove_var(ENV_OUTPUT_DIR);
}

#[test]
#[serial]
fn test_load_sample_config() {
    clear_env();
    let project = common::sample_project();
    let config = Config::load(&project.config_path).unwrap();

    assert_eq!(config.degree_day_factor, 5.0);
    assert_eq!(config.climate_files.len(), 2);
    assert_eq!(config.climate_files[0], project.path().join("climate_2005.csv"));
    assert_eq!(config.discharge_file, project.path().join("discharge.csv"));
    assert_eq!(config.output_dir, project.path().join("out"));
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let project = common::sample_project();
    std::env::set_var(ENV_DEGREE_DAY_FACTOR, "6.5");
    std::env::set_var(ENV_OUTPUT_DIR, "/tmp/glacier-melt-out");

    let config = Config::load(&project.config_path);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.degree_day_factor, 6.5);
    assert_eq!(config.output_dir, PathBuf::from("/tmp/glacier-melt-out"));
}

#[test]
#[serial]
fn test_env_factor_must_be_numeric() {
    clear_env();
    let project = common::sample_project();
    std::env::set_var(ENV_DEGREE_DAY_FACTOR, "five");

    let result = Config::load(&project.config_path);
    clear_env();

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
#[serial]
fn test_missing_config_file() {
    clear_env();
    let result = Config::load(std::path::Path::new("/nonexistent/glacier-melt.toml"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
#[serial]
fn test_unknown_key_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(
        dir.path(),
        "glacier-melt.toml",
        r#"
climate_files = ["c.csv"]
discharge_file = "d.csv"
degree_day_factr = 4.0
[seasonal_windows]
"2005" = [6, 9]
"#,
    );
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
}
