use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {pairs} month(s) with both melt and discharge, need at least 2")]
    InsufficientData { pairs: usize },

    #[error("Correlation undefined: {0} series is constant")]
    ZeroVariance(&'static str),
}
