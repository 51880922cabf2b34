/// Raw tabular sources
///
/// Reads a CSV file or the first sheet of a workbook into a header row plus
/// untyped cells. Headers are normalized once here so that the loaders can
/// match them against their declared column mappings.
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::loaders::LoadError;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y", "%Y%m%d"];

// 9999-12-31
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const MISSING_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "-"];

static EMPTY: Cell = Cell::Empty;

/// A single untyped cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Empty cells and the usual "not available" markers.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty()
                    || MISSING_MARKERS
                        .iter()
                        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
            }
            Cell::Number(f) => f.is_nan(),
            Cell::Date(_) => false,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(value) => {
                compact_date_number(*value).or_else(|| excel_serial_to_date(*value))
            }
            Cell::Text(s) => parse_date(s),
            Cell::Empty => None,
        }
    }

    /// Finite numeric value, if the cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(f) => *f,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Date(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            // Station ids stored as numbers in workbooks
            Cell::Number(f) if f.fract() == 0.0 => format!("{f:.0}"),
            Cell::Number(f) => f.to_string(),
            Cell::Date(d) => d.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => write!(f, ""),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => Cell::Date(datetime.date()),
                None => Cell::Number(dt.as_f64()),
            },
            Data::Error(e) => Cell::Text(format!("{e:?}")),
        }
    }
}

/// Header row plus data rows of one source file.
#[derive(Debug, Clone)]
pub struct RawTable {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table from raw header names; headers are normalized.
    pub fn new(
        source_name: impl Into<String>,
        raw_headers: &[String],
        rows: Vec<Vec<Cell>>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            headers: raw_headers.iter().map(|h| normalize_header(h)).collect(),
            rows,
        }
    }

    /// Read a source file, choosing the reader from its extension.
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let source_name = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let table = match extension.as_str() {
            "csv" | "txt" => {
                let file = File::open(path).map_err(|e| LoadError::Open {
                    source_name: source_name.clone(),
                    msg: e.to_string(),
                })?;
                Self::from_csv_reader(&source_name, file)?
            }
            "xlsx" | "xlsm" | "xls" | "ods" => Self::from_workbook(path)?,
            _ => return Err(LoadError::UnsupportedFormat(source_name)),
        };

        info!(
            "Read {} rows ({} columns) from {}",
            table.len(),
            table.headers.len(),
            table.source_name
        );
        Ok(table)
    }

    pub fn from_csv_reader<R: Read>(source_name: &str, reader: R) -> Result<Self, LoadError> {
        let csv_error = |error| LoadError::Csv {
            source_name: source_name.to_string(),
            error,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let raw_headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self::new(source_name, &raw_headers, rows))
    }

    /// First sheet of a workbook; the first row holds the headers.
    fn from_workbook(path: &Path) -> Result<Self, LoadError> {
        let source_name = path.display().to_string();
        let workbook_error = |msg: String| LoadError::Workbook {
            source_name: source_name.clone(),
            msg,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Open {
            source_name: source_name.clone(),
            msg: e.to_string(),
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?
            .map_err(|e| workbook_error(e.to_string()))?;

        let mut row_iter = range.rows();
        let raw_headers: Vec<String> = row_iter
            .next()
            .ok_or_else(|| workbook_error("first sheet is empty".to_string()))?
            .iter()
            .map(|cell| cell.to_string())
            .collect();

        let rows: Vec<Vec<Cell>> = row_iter
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        debug!("Workbook {} first sheet: {} data rows", source_name, rows.len());
        Ok(Self::new(source_name, &raw_headers, rows))
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Normalized header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = normalize_header(column);
        self.headers.iter().position(|h| *h == wanted)
    }

    /// Index of a declared column, failing the load when it is absent.
    pub fn require_column(&self, field: &'static str, column: &str) -> Result<usize, LoadError> {
        self.column_index(column)
            .ok_or_else(|| LoadError::MissingColumn {
                source_name: self.source_name.clone(),
                field,
                column: column.to_string(),
            })
    }

    /// Cell at (row, col); short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Date at (row, col). Rows are reported 1-based in errors.
    pub fn date(&self, row: usize, col: usize) -> Result<NaiveDate, LoadError> {
        let cell = self.cell(row, col);
        cell.as_date().ok_or_else(|| LoadError::InvalidDate {
            source_name: self.source_name.clone(),
            row: row + 1,
            value: cell.to_string(),
        })
    }

    /// Required numeric value at (row, col).
    pub fn number(&self, row: usize, col: usize) -> Result<f64, LoadError> {
        let cell = self.cell(row, col);
        cell.as_f64().ok_or_else(|| LoadError::InvalidNumber {
            source_name: self.source_name.clone(),
            row: row + 1,
            column: self.headers.get(col).cloned().unwrap_or_default(),
            value: cell.to_string(),
        })
    }
}

fn header_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"[\(\[][^\)\]]*[\)\]]").expect("unit pattern is valid"),
            Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"),
        )
    })
}

/// Canonical form of a column header.
///
/// Lower-cased, units in brackets removed, runs of other characters collapsed
/// to `_`: `"Mean Temperature (°C)"` becomes `"mean_temperature"`.
pub fn normalize_header(name: &str) -> String {
    let (units, separators) = header_patterns();
    let lowered = name.trim().trim_start_matches('\u{feff}').to_lowercase();
    let without_units = units.replace_all(&lowered, " ");
    separators
        .replace_all(&without_units, "_")
        .trim_matches('_')
        .to_string()
}

/// Parse a calendar date in one of the accepted text formats.
///
/// A trailing time component (`2005-06-01T00:00:00`, `2005-06-01 12:00`) is
/// ignored.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = match trimmed.find(['T', ' ']) {
        Some(idx) if idx >= 8 => &trimmed[..idx],
        _ => trimmed,
    };

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Convert an Excel date serial to a date.
///
/// Serials past 9999-12-31, the last date Excel can represent, are rejected.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel epoch: 1899-12-30 (adjusted for Excel's off-by-one bug)
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Duration::try_days(serial as i64).and_then(|days| epoch.checked_add_signed(days))
}

/// A yyyymmdd date stored as a plain number, e.g. `20050601`.
fn compact_date_number(value: f64) -> Option<NaiveDate> {
    if value.fract() != 0.0 || !(10_000_101.0..=99_991_231.0).contains(&value) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{value:.0}"), "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_normalize_header_strips_units() {
        assert_eq!(normalize_header("Mean Temperature (°C)"), "mean_temperature");
        assert_eq!(normalize_header("  Station Name "), "station_name");
        assert_eq!(normalize_header("Q [m3/s]"), "q");
    }

    #[test]
    fn test_normalize_header_strips_bom() {
        assert_eq!(normalize_header("\u{feff}Date"), "date");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2005, 6, 1).unwrap();
        assert_eq!(parse_date("2005-06-01"), Some(expected));
        assert_eq!(parse_date("2005/06/01"), Some(expected));
        assert_eq!(parse_date("01.06.2005"), Some(expected));
        assert_eq!(parse_date("01/06/2005"), Some(expected));
        assert_eq!(parse_date("20050601"), Some(expected));
    }

    #[test]
    fn test_parse_date_ignores_time() {
        let expected = NaiveDate::from_ymd_opt(2005, 6, 1).unwrap();
        assert_eq!(parse_date("2005-06-01T00:00:00"), Some(expected));
        assert_eq!(parse_date("2005-06-01 12:30"), Some(expected));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2005-13-01"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        // 38504 = June 1, 2005
        let date = excel_serial_to_date(38504.0).unwrap();
        assert_eq!(date.year(), 2005);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(0.5), None);
        assert_eq!(excel_serial_to_date(1e15), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
        assert_eq!(
            excel_serial_to_date(2_958_465.0),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(2_958_466.0), None);
    }

    #[test]
    fn test_huge_numeric_date_is_invalid_date() {
        let headers = vec!["date".to_string()];
        let table = RawTable::new("book.xlsx", &headers, vec![vec![Cell::Number(1e15)]]);
        match table.date(0, 0) {
            Err(LoadError::InvalidDate { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "1000000000000000");
            }
            other => panic!("Expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_yyyymmdd_date() {
        let expected = NaiveDate::from_ymd_opt(2005, 6, 1);
        assert_eq!(Cell::Number(20050601.0).as_date(), expected);
        assert_eq!(Cell::Number(38504.0).as_date(), expected);
        assert_eq!(Cell::Number(20051301.0).as_date(), None);
    }

    #[test]
    fn test_cell_missing_markers() {
        assert!(Cell::Empty.is_missing());
        assert!(Cell::Text("NA".to_string()).is_missing());
        assert!(Cell::Text(" nan ".to_string()).is_missing());
        assert!(!Cell::Text("0.0".to_string()).is_missing());
        assert!(!Cell::Number(0.0).is_missing());
    }

    #[test]
    fn test_cell_as_f64() {
        assert_eq!(Cell::Text(" -1.5 ".to_string()).as_f64(), Some(-1.5));
        assert_eq!(Cell::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(Cell::Text("warm".to_string()).as_f64(), None);
        assert_eq!(Cell::Text("inf".to_string()).as_f64(), None);
        assert_eq!(Cell::Empty.as_f64(), None);
    }

    #[test]
    fn test_cell_as_text_formats_integral_numbers() {
        assert_eq!(Cell::Number(2019.0).as_text(), "2019");
        assert_eq!(Cell::Text(" ABC ".to_string()).as_text(), "ABC");
    }

    #[test]
    fn test_csv_reader_keeps_short_rows_as_empty() {
        let data = "date,value\n2005-06-01,1.0\n2005-06-02\n";
        let table = RawTable::from_csv_reader("inline", data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 1), &Cell::Empty);
        assert_eq!(table.cell(0, 1), &Cell::Text("1.0".to_string()));
    }

    #[test]
    fn test_require_column_reports_missing() {
        let data = "date,value\n";
        let table = RawTable::from_csv_reader("inline", data.as_bytes()).unwrap();
        assert_eq!(table.require_column("value", "Value").unwrap(), 1);
        match table.require_column("station_id", "station_id") {
            Err(LoadError::MissingColumn { column, .. }) => assert_eq!(column, "station_id"),
            other => panic!("Expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RawTable::read(Path::new("climate.parquet"));
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }
}
