//! Monthly aggregation and melt/discharge comparison.
//!
//! Submodules:
//! - `aggregation`: groups daily records by (year, month) and joins the two series.
//! - `statistics`: running mean/sample standard deviation and Pearson correlation.

pub mod aggregation;
pub mod error;
pub mod statistics;

pub use aggregation::{
    combine, monthly_discharge, monthly_melt, monthly_totals, paired_totals, year_summaries,
    MonthlyTotal,
};
pub use error::AnalysisError;
pub use statistics::{pearson_correlation, RunningStats};
