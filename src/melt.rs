//! Degree-day (temperature-index) melt model.
//!
//! Melt is proportional to the positive part of the daily mean temperature:
//! `daily_melt = degree_day_factor * max(mean_temp, 0)`.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, instrument};

use crate::models::{ClimateRecord, MeltRecord};

/// Default degree-day factor in mm w.e. per °C per day.
pub const DEFAULT_DEGREE_DAY_FACTOR: f64 = 5.0;

#[derive(Error, Debug, PartialEq)]
pub enum MeltError {
    #[error("Non-numeric or missing mean temperature for station '{station}' on {date}")]
    NonNumericTemperature { station: String, date: NaiveDate },

    #[error("Invalid degree-day factor: {0}")]
    InvalidFactor(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeDayModel {
    factor: f64,
}

impl Default for DegreeDayModel {
    fn default() -> Self {
        Self {
            factor: DEFAULT_DEGREE_DAY_FACTOR,
        }
    }
}

impl DegreeDayModel {
    /// The factor must be finite and non-negative so that melt stays ≥ 0.
    pub fn new(factor: f64) -> Result<Self, MeltError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(MeltError::InvalidFactor(factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Melt for a single daily mean temperature. Zero at or below 0°C.
    pub fn daily_melt(&self, mean_temp: f64) -> f64 {
        if mean_temp > 0.0 {
            self.factor * mean_temp
        } else {
            0.0
        }
    }

    pub fn melt_record(&self, record: &ClimateRecord) -> Result<MeltRecord, MeltError> {
        let mean_temp = record
            .mean_temp
            .filter(|t| t.is_finite())
            .ok_or_else(|| MeltError::NonNumericTemperature {
                station: record.station_name.clone(),
                date: record.date,
            })?;

        Ok(MeltRecord {
            climate: record.clone(),
            daily_melt: self.daily_melt(mean_temp),
        })
    }

    /// Apply the model to every record, preserving input order.
    ///
    /// Stops at the first record without a usable temperature.
    #[instrument(skip(self, records), fields(factor = self.factor, records = records.len()))]
    pub fn apply(&self, records: &[ClimateRecord]) -> Result<Vec<MeltRecord>, MeltError> {
        let melt = records
            .iter()
            .map(|record| self.melt_record(record))
            .collect::<Result<Vec<_>, _>>()?;

        let total: f64 = melt.iter().map(|m| m.daily_melt).sum();
        info!(
            "Computed melt for {} records ({:.1} mm w.e. total)",
            melt.len(),
            total
        );
        Ok(melt)
    }
}
