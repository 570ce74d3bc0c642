use std::path::PathBuf;

use crate::csv_rows::{parse_csv_file, CsvRow};
use crate::error::{DeskError, Result};

pub fn run(file: &str, columns: &[String]) -> Result<()> {
    let table = parse_csv_file(&PathBuf::from(file))?;
    tracing::debug!(headers = %table.headers.join(","), "csv headers");
    if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
        return Err(DeskError::Other(format!("No column named {missing:?} in {file}")));
    }
    let rows: Vec<CsvRow> = if columns.is_empty() {
        table.rows
    } else {
        table.rows.iter().map(|r| r.select(columns)).collect()
    };
    tracing::info!(
        rows = rows.len(),
        columns = rows.first().map_or(0, CsvRow::len),
        file,
        "parsed CSV"
    );
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
