use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Loaded source records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateRecord {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    /// Daily mean air temperature in °C. `None` when the source cell was
    /// empty or not a number; the melt stage rejects such records.
    pub mean_temp: Option<f64>,
    pub year: i32,
    pub month: u32,
}

impl ClimateRecord {
    pub fn new(
        station_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        mean_temp: Option<f64>,
    ) -> Self {
        Self {
            station_name: station_name.into(),
            latitude,
            longitude,
            date,
            mean_temp,
            year: date.year(),
            month: date.month(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DischargeRecord {
    pub station_id: String,
    pub date: NaiveDate,
    pub value: f64,
    pub year: i32,
    pub month: u32,
}

impl DischargeRecord {
    pub fn new(station_id: impl Into<String>, date: NaiveDate, value: f64) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            value,
            year: date.year(),
            month: date.month(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeltRecord {
    #[serde(flatten)]
    pub climate: ClimateRecord,
    /// Melt depth in mm water equivalent.
    pub daily_melt: f64,
}

/// Anything that can be grouped into a (year, month) bucket.
pub trait Monthly {
    fn year(&self) -> i32;
    fn month(&self) -> u32;

    fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year(),
            month: self.month(),
        }
    }
}

impl Monthly for ClimateRecord {
    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> u32 {
        self.month
    }
}

impl Monthly for DischargeRecord {
    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> u32 {
        self.month
    }
}

impl Monthly for MeltRecord {
    fn year(&self) -> i32 {
        self.climate.year
    }

    fn month(&self) -> u32 {
        self.climate.month
    }
}

/// Grouping key. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

// Analysis outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    /// `None` when no melt record fell in this month.
    pub total_melt: Option<f64>,
    /// `None` when no discharge record fell in this month.
    pub total_discharge: Option<f64>,
    pub melt_days: usize,
    pub discharge_days: usize,
}

impl MonthlyAggregate {
    /// Both totals, when both sides are present.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match (self.total_melt, self.total_discharge) {
            (Some(melt), Some(discharge)) => Some((melt, discharge)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub mean_melt: Option<f64>,
    pub sd_melt: Option<f64>,
    pub mean_discharge: Option<f64>,
    pub sd_discharge: Option<f64>,
}

// Seasonal windows

/// Inclusive month range retained for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct SeasonalWindow {
    month_start: u32,
    month_end: u32,
}

impl SeasonalWindow {
    pub fn new(month_start: u32, month_end: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month_start) || !(1..=12).contains(&month_end) {
            return Err(format!(
                "months must be within 1..=12, got ({month_start}, {month_end})"
            ));
        }
        if month_start > month_end {
            return Err(format!(
                "month_start {month_start} is after month_end {month_end}"
            ));
        }
        Ok(Self {
            month_start,
            month_end,
        })
    }

    pub fn contains(&self, month: u32) -> bool {
        (self.month_start..=self.month_end).contains(&month)
    }
}

impl TryFrom<(u32, u32)> for SeasonalWindow {
    type Error = String;

    fn try_from((start, end): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<SeasonalWindow> for (u32, u32) {
    fn from(window: SeasonalWindow) -> Self {
        (window.month_start, window.month_end)
    }
}

/// Per-year inclusion windows. Years without an entry are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeasonalWindows(BTreeMap<i32, SeasonalWindow>);

impl SeasonalWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, window: SeasonalWindow) -> Option<SeasonalWindow> {
        self.0.insert(year, window)
    }

    pub fn get(&self, year: i32) -> Option<&SeasonalWindow> {
        self.0.get(&year)
    }

    pub fn includes(&self, year: i32, month: u32) -> bool {
        self.get(year).is_some_and(|w| w.contains(month))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(i32, SeasonalWindow)> for SeasonalWindows {
    fn from_iter<T: IntoIterator<Item = (i32, SeasonalWindow)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
