use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;

/// One data row keyed by header name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Keep only the named columns, in the order given. Unknown names are skipped.
    pub fn select(&self, columns: &[String]) -> CsvRow {
        let fields = columns
            .iter()
            .filter_map(|c| self.get(c).map(|v| (c.clone(), v.to_string())))
            .collect();
        CsvRow { fields }
    }
}

impl Serialize for CsvRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parsed CSV: the header row and the data rows keyed by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// Parse CSV text whose first row names the columns. Blank lines are skipped,
/// short rows are padded with empty values and surplus cells are dropped.
pub fn parse_csv(text: &str) -> Result<CsvTable> {
    let text = text.trim_start_matches('\u{feff}');
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(CsvRow { fields });
    }
    Ok(CsvTable { headers, rows })
}

pub fn parse_csv_file(path: &Path) -> Result<CsvTable> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}
