use chrono::Datelike;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use glacier_melt::loaders::table::normalize_header;
use glacier_melt::loaders::{ClimateColumns, DischargeColumns, RawTable};

#[derive(Parser)]
#[command(name = "inspect-table")]
#[command(about = "Show how a climate or discharge file maps onto the loader fields", long_about = None)]
struct Cli {
    /// CSV or workbook file to inspect
    file: PathBuf,

    /// Column that holds the date (before normalization)
    #[arg(long, default_value = "date")]
    date_column: String,

    /// Number of data rows to print
    #[arg(long, default_value = "5")]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Opening source: {}", cli.file.display());
    let table = RawTable::read(&cli.file)?;
    println!("Rows: {}", table.len());

    let climate = ClimateColumns::default();
    let discharge = DischargeColumns::default();
    let known: BTreeMap<String, &str> = [
        (&climate.station_name, "climate.station_name"),
        (&climate.latitude, "climate.latitude"),
        (&climate.longitude, "climate.longitude"),
        (&climate.date, "climate.date / discharge.date"),
        (&climate.mean_temp, "climate.mean_temp"),
        (&discharge.station_id, "discharge.station_id"),
        (&discharge.value, "discharge.value"),
    ]
    .into_iter()
    .map(|(column, field)| (normalize_header(column), field))
    .collect();

    println!("\nColumns:");
    println!("{}", "=".repeat(60));
    for (i, header) in table.headers().iter().enumerate() {
        match known.get(header) {
            Some(field) => println!("  {i:3}: {header:<30} -> {field}"),
            None => println!("  {i:3}: {header:<30}    (dropped)"),
        }
    }

    println!("\nFirst {} rows:", cli.rows);
    println!("{}", "=".repeat(60));
    for (row_idx, row) in table.rows().iter().enumerate().take(cli.rows) {
        print!("Row {:3}: ", row_idx + 1);
        for cell in row {
            print!("[{cell}] ");
        }
        println!();
    }

    let Some(date_col) = table.column_index(&cli.date_column) else {
        println!("\nNo '{}' column, skipping coverage", cli.date_column);
        return Ok(());
    };

    let mut coverage: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    let mut bad_dates = 0usize;
    for row in 0..table.len() {
        match table.cell(row, date_col).as_date() {
            Some(date) => *coverage.entry((date.year(), date.month())).or_default() += 1,
            None => bad_dates += 1,
        }
    }

    println!("\nRows per (year, month):");
    println!("{}", "=".repeat(60));
    for ((year, month), count) in &coverage {
        println!("  {year}-{month:02}: {count}");
    }
    if bad_dates > 0 {
        println!("\n{bad_dates} rows have an unparseable date");
    }

    Ok(())
}
