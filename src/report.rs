use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::pipeline::PipelineOutput;

pub const MONTHLY_FILE: &str = "monthly.csv";
pub const YEARLY_FILE: &str = "yearly.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths of the files written by `write_reports`.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub monthly: PathBuf,
    pub yearly: PathBuf,
    pub summary: PathBuf,
}

/// Write `rows` as CSV with a header row. `None` fields become empty cells.
pub fn write_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Write the monthly table, the year summary and a JSON summary into `dir`.
pub fn write_reports(output: &PipelineOutput, dir: &Path) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let paths = ReportPaths {
        monthly: dir.join(MONTHLY_FILE),
        yearly: dir.join(YEARLY_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    write_csv(&output.monthly, &paths.monthly)?;
    write_csv(&output.yearly, &paths.yearly)?;

    let json = serde_json::to_string_pretty(output)?;
    fs::write(&paths.summary, json).map_err(|source| ReportError::Io {
        path: paths.summary.display().to_string(),
        source,
    })?;

    info!("Wrote reports to {}", dir.display());
    Ok(paths)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Plain-text rendering of the monthly table, correlation and year summary.
pub fn render_summary(output: &PipelineOutput) -> String {
    let mut out = format!(
        "Degree-day factor: {} mm w.e. / °C / day\n",
        output.degree_day_factor
    );
    out.push_str(&format!(
        "Records: {} climate, {} discharge\n\n",
        output.climate_records, output.discharge_records
    ));

    out.push_str(&format!(
        "{:<6} {:<10} {:>14} {:>16}\n",
        "Year", "Month", "Melt (mm)", "Discharge"
    ));
    out.push_str(&"-".repeat(49));
    out.push('\n');
    for row in &output.monthly {
        out.push_str(&format!(
            "{:<6} {:<10} {:>14} {:>16}\n",
            row.year,
            month_name(row.month),
            cell(row.total_melt),
            cell(row.total_discharge)
        ));
    }

    out.push_str(&format!(
        "\nPearson r (melt vs discharge): {:.4} over {} months\n\n",
        output.correlation, output.paired_months
    ));

    out.push_str(&format!(
        "{:<6} {:>12} {:>12} {:>14} {:>14}\n",
        "Year", "Mean melt", "SD melt", "Mean disch.", "SD disch."
    ));
    out.push_str(&"-".repeat(62));
    out.push('\n');
    for year in &output.yearly {
        out.push_str(&format!(
            "{:<6} {:>12} {:>12} {:>14} {:>14}\n",
            year.year,
            cell(year.mean_melt),
            cell(year.sd_melt),
            cell(year.mean_discharge),
            cell(year.sd_discharge)
        ));
    }

    out
}
