use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::analysis::RunningStats;
use crate::models::{
    DischargeRecord, MeltRecord, MonthKey, Monthly, MonthlyAggregate, YearSummary,
};

/// Sum of a daily quantity over one (year, month) group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyTotal {
    pub total: f64,
    pub count: usize,
}

/// Group records by their derived (year, month) and sum `value` per group.
pub fn monthly_totals<T, F>(records: &[T], value: F) -> BTreeMap<MonthKey, MonthlyTotal>
where
    T: Monthly,
    F: Fn(&T) -> f64,
{
    let mut groups: BTreeMap<MonthKey, MonthlyTotal> = BTreeMap::new();
    for record in records {
        let group = groups.entry(record.month_key()).or_default();
        group.total += value(record);
        group.count += 1;
    }
    groups
}

pub fn monthly_melt(records: &[MeltRecord]) -> BTreeMap<MonthKey, MonthlyTotal> {
    monthly_totals(records, |r| r.daily_melt)
}

pub fn monthly_discharge(records: &[DischargeRecord]) -> BTreeMap<MonthKey, MonthlyTotal> {
    monthly_totals(records, |r| r.value)
}

/// Full outer join of the two monthly series on (year, month).
///
/// Each key present on either side appears exactly once, in chronological
/// order. A side without records for that month is `None`, never zero.
#[instrument(skip_all, fields(melt_months = melt.len(), discharge_months = discharge.len()))]
pub fn combine(
    melt: &BTreeMap<MonthKey, MonthlyTotal>,
    discharge: &BTreeMap<MonthKey, MonthlyTotal>,
) -> Vec<MonthlyAggregate> {
    let mut keys: Vec<MonthKey> = melt.keys().chain(discharge.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    let rows: Vec<MonthlyAggregate> = keys
        .into_iter()
        .map(|key| {
            let melt_total = melt.get(&key);
            let discharge_total = discharge.get(&key);

            match (melt_total, discharge_total) {
                (Some(_), None) => warn!("{}-{:02}: melt without discharge", key.year, key.month),
                (None, Some(_)) => warn!("{}-{:02}: discharge without melt", key.year, key.month),
                _ => {}
            }

            MonthlyAggregate {
                year: key.year,
                month: key.month,
                total_melt: melt_total.map(|m| m.total),
                total_discharge: discharge_total.map(|d| d.total),
                melt_days: melt_total.map_or(0, |m| m.count),
                discharge_days: discharge_total.map_or(0, |d| d.count),
            }
        })
        .collect();

    debug!("Combined {} monthly rows", rows.len());
    rows
}

/// Per-year mean and sample standard deviation of the monthly totals.
///
/// Only present values contribute; a statistic with too few values is `None`.
pub fn year_summaries(rows: &[MonthlyAggregate]) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, (RunningStats, RunningStats)> = BTreeMap::new();

    for row in rows {
        let (melt, discharge) = by_year.entry(row.year).or_default();
        melt.extend(row.total_melt);
        discharge.extend(row.total_discharge);
    }

    by_year
        .into_iter()
        .map(|(year, (melt, discharge))| YearSummary {
            year,
            mean_melt: melt.mean(),
            sd_melt: melt.sample_std_dev(),
            mean_discharge: discharge.mean(),
            sd_discharge: discharge.sample_std_dev(),
        })
        .collect()
}

/// Months where both totals are present, in row order.
pub fn paired_totals(rows: &[MonthlyAggregate]) -> Vec<(f64, f64)> {
    rows.iter().filter_map(MonthlyAggregate::pair).collect()
}
