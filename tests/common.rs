// Shared fixtures for the integration tests
// Writes small climate/discharge sources and a config file into a temp dir

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CLIMATE_HEADER: &str =
    "Longitude,Latitude,Station Name,Date,Mean Temperature (°C),Total Precipitation (mm)";

pub const DISCHARGE_HEADER: &str = "Station ID,Date,Value";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Climate CSV with one row per (date, temperature).
pub fn climate_csv(rows: &[(&str, &str)]) -> String {
    let mut out = format!("{CLIMATE_HEADER}\n");
    for (date, temp) in rows {
        out.push_str(&format!("8.02,46.55,GRIMSEL HOSPIZ,{date},{temp},0.0\n"));
    }
    out
}

/// Discharge CSV with one row per (date, value).
pub fn discharge_csv(rows: &[(&str, &str)]) -> String {
    let mut out = format!("{DISCHARGE_HEADER}\n");
    for (date, value) in rows {
        out.push_str(&format!("2019,{date},{value}\n"));
    }
    out
}

/// A project directory with climate_2005.csv, climate_2006.csv,
/// discharge.csv and glacier-melt.toml.
pub struct Project {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Project {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn sample_project() -> Project {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    write_file(
        dir.path(),
        "climate_2005.csv",
        &climate_csv(&[
            ("2005-05-31", "4.0"),
            ("2005-06-01", "2.0"),
            ("2005-06-02", "-1.0"),
            ("2005-06-03", "0.0"),
            ("2005-06-04", "5.0"),
            ("2005-07-01", "4.0"),
            ("2005-08-01", "6.0"),
            ("2005-09-01", "1.0"),
            ("2005-10-01", "3.0"),
        ]),
    );
    write_file(
        dir.path(),
        "climate_2006.csv",
        &climate_csv(&[
            ("2006-05-01", "1.0"),
            ("2006-07-15", "3.0"),
            ("2006-10-31", "2.0"),
        ]),
    );
    write_file(
        dir.path(),
        "discharge.csv",
        &discharge_csv(&[
            ("2004-07-01", "99.0"),
            ("2005-06-01", "10.0"),
            ("2005-06-02", "12.0"),
            ("2005-07-01", "18.0"),
            ("2005-08-01", "33.0"),
            ("2006-05-01", "8.0"),
            ("2006-07-15", "21.0"),
            ("2006-08-15", "30.0"),
        ]),
    );

    let config_path = write_file(
        dir.path(),
        "glacier-melt.toml",
        r#"
degree_day_factor = 5.0
climate_files = ["climate_2005.csv", "climate_2006.csv"]
discharge_file = "discharge.csv"
output_dir = "out"

[seasonal_windows]
"2005" = [6, 9]
"2006" = [5, 10]
"#,
    );

    Project { dir, config_path }
}
