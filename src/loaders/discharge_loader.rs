use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::loaders::{LoadError, RawTable};
use crate::models::{DischargeRecord, SeasonalWindows};

/// Source column names for each discharge field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeColumns {
    pub station_id: String,
    pub date: String,
    pub value: String,
}

impl Default for DischargeColumns {
    fn default() -> Self {
        Self {
            station_id: "station_id".to_string(),
            date: "date".to_string(),
            value: "value".to_string(),
        }
    }
}

/// Loads observed discharge restricted to the seasonal windows.
pub struct DischargeLoader {
    columns: DischargeColumns,
    windows: SeasonalWindows,
}

impl DischargeLoader {
    pub fn new(columns: DischargeColumns, windows: SeasonalWindows) -> Self {
        Self { columns, windows }
    }

    #[instrument(skip(self))]
    pub fn load_file(&self, path: &Path) -> Result<Vec<DischargeRecord>, LoadError> {
        let table = RawTable::read(path)?;
        let records = self.parse_table(&table)?;
        info!(
            "Loaded {} discharge records from {}",
            records.len(),
            table.source_name()
        );
        Ok(records)
    }

    /// Convert a raw table into discharge records.
    ///
    /// Unlike temperatures, discharge values have no later validation stage,
    /// so an empty or non-numeric value inside a window fails the load.
    pub fn parse_table(&self, table: &RawTable) -> Result<Vec<DischargeRecord>, LoadError> {
        let station_col = table.require_column("station_id", &self.columns.station_id)?;
        let date_col = table.require_column("date", &self.columns.date)?;
        let value_col = table.require_column("value", &self.columns.value)?;

        let mut records = Vec::new();
        for row in 0..table.len() {
            let date = table.date(row, date_col)?;
            if !self.windows.includes(date.year(), date.month()) {
                continue;
            }

            records.push(DischargeRecord::new(
                table.cell(row, station_col).as_text(),
                date,
                table.number(row, value_col)?,
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
