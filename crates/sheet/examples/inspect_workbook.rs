//! Print the sheets of a workbook and the period layout of one header row.
//!
//! Run with: cargo run --example inspect_workbook -p regstat-sheet -- raw.xlsx 고용률 2

use regstat_sheet::WorkbookCache;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or("usage: inspect_workbook <WORKBOOK> [SHEET] [HEADER_ROW]")?;
    let sheet = args.next();
    let header_row: usize = args.next().map_or(Ok(0), |s| s.parse())?;

    let cache = WorkbookCache::new();

    println!("=== Sheets in {path} ===");
    for name in cache.sheet_names(&path)? {
        println!("  {name}");
    }

    let Some(sheet) = sheet else {
        return Ok(());
    };

    let matched = cache.resolve_sheet(&path, &sheet)?;
    println!(
        "\n'{sheet}' -> '{}' ({:?}, score {:.2})",
        matched.name, matched.strategy, matched.score
    );

    let table = cache.get_table(&path, &sheet)?;
    println!("{} rows x {} cols", table.row_count(), table.col_count());

    let index = table.period_index(header_row);
    println!("\n=== Periods in row {header_row} ===");
    for (year, col) in index.years() {
        println!("  {year:<10} col {col}");
    }
    for (key, col) in index.quarter_keys() {
        println!("  {key:<10} col {col}");
    }
    if index.is_empty() {
        println!("  (no period labels recognized)");
    }

    Ok(())
}
