//! Batch pipeline: load, compute melt, aggregate, compare.
//!
//! Stages run sequentially and the first failure aborts the run. All inputs
//! come from the `Config` passed in; nothing is read from process state here.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::analysis::{
    combine, monthly_discharge, monthly_melt, paired_totals, pearson_correlation, year_summaries,
    AnalysisError,
};
use crate::config::{Config, ConfigError};
use crate::loaders::{ClimateLoader, DischargeLoader, LoadError};
use crate::melt::{DegreeDayModel, MeltError};
use crate::models::{ClimateRecord, DischargeRecord, MonthlyAggregate, YearSummary};
use crate::report::ReportError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Data format error: {0}")]
    Load(#[from] LoadError),

    #[error("Melt calculation failed: {0}")]
    Melt(#[from] MeltError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to write report: {0}")]
    Report(#[from] ReportError),
}

/// Everything the reporting step needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub degree_day_factor: f64,
    pub climate_records: usize,
    pub discharge_records: usize,
    pub monthly: Vec<MonthlyAggregate>,
    /// Pearson correlation between monthly melt and discharge totals.
    pub correlation: f64,
    /// Number of months where both totals are present.
    pub paired_months: usize,
    pub yearly: Vec<YearSummary>,
}

/// Run all stages on already loaded records.
pub fn analyze(
    model: &DegreeDayModel,
    climate: &[ClimateRecord],
    discharge: &[DischargeRecord],
) -> Result<PipelineOutput, PipelineError> {
    let melt = model.apply(climate)?;

    let monthly = combine(&monthly_melt(&melt), &monthly_discharge(discharge));
    let pairs = paired_totals(&monthly);
    let correlation = pearson_correlation(&pairs)?;
    let yearly = year_summaries(&monthly);

    info!(
        "Correlation between monthly melt and discharge: {:.4} over {} months",
        correlation,
        pairs.len()
    );

    Ok(PipelineOutput {
        degree_day_factor: model.factor(),
        climate_records: climate.len(),
        discharge_records: discharge.len(),
        monthly,
        correlation,
        paired_months: pairs.len(),
        yearly,
    })
}

/// Load the configured sources and run the analysis.
#[instrument(skip(config), fields(factor = config.degree_day_factor))]
pub fn run(config: &Config) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let model = DegreeDayModel::new(config.degree_day_factor)?;

    info!("Loading climate records");
    let climate = ClimateLoader::new(
        config.climate_columns.clone(),
        config.seasonal_windows.clone(),
    )
    .load_files(&config.climate_files)?;

    info!("Loading discharge records");
    let discharge = DischargeLoader::new(
        config.discharge_columns.clone(),
        config.seasonal_windows.clone(),
    )
    .load_file(&config.discharge_file)?;

    analyze(&model, &climate, &discharge)
}
