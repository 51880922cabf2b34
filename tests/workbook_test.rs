// Tests for reading workbook sources through calamine

use chrono::NaiveDate;
use glacier_melt::loaders::{Cell, ClimateColumns, ClimateLoader, RawTable};
use glacier_melt::models::{SeasonalWindow, SeasonalWindows};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("sample-data-files")
        .join(name)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_workbook_headers_are_normalized() {
    let table = RawTable::read(&fixture("climate_2005.xlsx")).unwrap();
    assert_eq!(
        table.headers(),
        &[
            "station_name",
            "latitude",
            "longitude",
            "date",
            "mean_temperature"
        ]
    );
}

#[test]
fn test_workbook_skips_empty_rows() {
    let table = RawTable::read(&fixture("climate_2005.xlsx")).unwrap();
    // Six sheet rows below the header, one of them blank
    assert_eq!(table.len(), 5);
    assert!(table
        .rows()
        .iter()
        .all(|row| row.iter().any(|cell| !cell.is_missing())));
}

#[test]
fn test_workbook_date_cells() {
    let table = RawTable::read(&fixture("climate_2005.xlsx")).unwrap();
    let date_col = table.column_index("Date").unwrap();

    // Date-formatted cell arrives as a calendar date
    assert_eq!(table.cell(0, date_col), &Cell::Date(date(2005, 6, 1)));
    // Unformatted serial stays numeric and converts on read
    assert_eq!(table.cell(1, date_col), &Cell::Number(38505.0));
    assert_eq!(table.date(1, date_col).unwrap(), date(2005, 6, 2));
    // Text and yyyymmdd number
    assert_eq!(table.date(2, date_col).unwrap(), date(2005, 6, 3));
    assert_eq!(table.date(3, date_col).unwrap(), date(2005, 7, 1));
}

#[test]
fn test_workbook_numeric_cells() {
    let table = RawTable::read(&fixture("climate_2005.xlsx")).unwrap();
    let lat = table.column_index("latitude").unwrap();
    let temp = table.column_index("mean_temperature").unwrap();

    assert_eq!(table.number(0, lat).unwrap(), 46.55);
    assert_eq!(table.cell(1, temp).as_f64(), Some(-1.5));
    assert!(table.cell(2, temp).is_missing());
}

#[test]
fn test_load_climate_workbook() {
    let windows: SeasonalWindows = [(2005, SeasonalWindow::new(6, 9).unwrap())]
        .into_iter()
        .collect();
    let loader = ClimateLoader::new(ClimateColumns::default(), windows);

    let records = loader.load_file(&fixture("climate_2005.xlsx")).unwrap();

    // The May row falls outside the window
    assert_eq!(records.len(), 4);
    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2005, 6, 1),
            date(2005, 6, 2),
            date(2005, 6, 3),
            date(2005, 7, 1)
        ]
    );
    let temps: Vec<Option<f64>> = records.iter().map(|r| r.mean_temp).collect();
    assert_eq!(temps, vec![Some(2.5), Some(-1.5), None, Some(4.0)]);
    assert_eq!(records[0].station_name, "GRIMSEL HOSPIZ");
    assert_eq!(records[0].longitude, 8.02);
}
