use thiserror::Error;

/// Data format errors raised while reading a climate or discharge source.
///
/// Any of these fails the whole load; no partially loaded table is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {source_name}: {msg}")]
    Open { source_name: String, msg: String },

    #[error("Failed to read CSV {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("Failed to read workbook {source_name}: {msg}")]
    Workbook { source_name: String, msg: String },

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("{source_name} is missing required column '{column}' (for field {field})")]
    MissingColumn {
        source_name: String,
        field: &'static str,
        column: String,
    },

    #[error("{source_name} row {row}: invalid date '{value}'")]
    InvalidDate {
        source_name: String,
        row: usize,
        value: String,
    },

    #[error("{source_name} row {row}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        source_name: String,
        row: usize,
        column: String,
        value: String,
    },
}
