use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::loaders::{LoadError, RawTable};
use crate::models::{ClimateRecord, SeasonalWindows};

/// Source column names for each climate field.
///
/// Names are matched after header normalization, so `"Mean Temperature (°C)"`
/// in a file matches `mean_temperature` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateColumns {
    pub station_name: String,
    pub latitude: String,
    pub longitude: String,
    pub date: String,
    pub mean_temp: String,
}

impl Default for ClimateColumns {
    fn default() -> Self {
        Self {
            station_name: "station_name".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            date: "date".to_string(),
            mean_temp: "mean_temperature".to_string(),
        }
    }
}

struct ClimateIndices {
    station_name: usize,
    latitude: usize,
    longitude: usize,
    date: usize,
    mean_temp: usize,
}

impl ClimateColumns {
    fn resolve(&self, table: &RawTable) -> Result<ClimateIndices, LoadError> {
        Ok(ClimateIndices {
            station_name: table.require_column("station_name", &self.station_name)?,
            latitude: table.require_column("latitude", &self.latitude)?,
            longitude: table.require_column("longitude", &self.longitude)?,
            date: table.require_column("date", &self.date)?,
            mean_temp: table.require_column("mean_temp", &self.mean_temp)?,
        })
    }
}

/// Loads daily temperature records restricted to the seasonal windows.
pub struct ClimateLoader {
    columns: ClimateColumns,
    windows: SeasonalWindows,
}

impl ClimateLoader {
    pub fn new(columns: ClimateColumns, windows: SeasonalWindows) -> Self {
        Self { columns, windows }
    }

    /// Load several per-year files, concatenated in the given order.
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<ClimateRecord>, LoadError> {
        let mut all_records = Vec::new();

        for path in paths {
            let mut records = self.load_file(path.as_ref())?;
            all_records.append(&mut records);
        }

        info!(
            "Loaded {} climate records from {} files",
            all_records.len(),
            paths.len()
        );
        Ok(all_records)
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<ClimateRecord>, LoadError> {
        let table = RawTable::read(path)?;
        self.parse_table(&table)
    }

    /// Convert a raw table into climate records.
    ///
    /// Every row must carry a parseable date, including rows that fall outside
    /// the seasonal windows; the first bad date rejects the whole table.
    pub fn parse_table(&self, table: &RawTable) -> Result<Vec<ClimateRecord>, LoadError> {
        let idx = self.columns.resolve(table)?;
        let mut records = Vec::new();

        for row in 0..table.len() {
            let date = table.date(row, idx.date)?;
            if !self.windows.includes(date.year(), date.month()) {
                continue;
            }

            let temp_cell = table.cell(row, idx.mean_temp);
            let mean_temp = if temp_cell.is_missing() {
                None
            } else {
                let value = temp_cell.as_f64();
                if value.is_none() {
                    warn!(
                        "{} row {}: non-numeric temperature '{}'",
                        table.source_name(),
                        row + 1,
                        temp_cell
                    );
                }
                value
            };

            records.push(ClimateRecord::new(
                table.cell(row, idx.station_name).as_text(),
                table.number(row, idx.latitude)?,
                table.number(row, idx.longitude)?,
                date,
                mean_temp,
            ));
        }

        debug!(
            "Kept {} of {} rows from {} inside seasonal windows",
            records.len(),
            table.len(),
            table.source_name()
        );
        Ok(records)
    }
}
