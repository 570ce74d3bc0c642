use std::path::Path;

use crate::error::{DeskError, Result};
use crate::models::Record;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch the record list from a URL or a local JSON file.
pub fn load_records(source: &str) -> Result<Vec<Record>> {
    let records = if is_remote(source) {
        fetch_remote(source)?
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        read_local(Path::new(path))?
    };
    tracing::debug!(count = records.len(), source, "records loaded");
    Ok(records)
}

/// Dashboard fetch policy: any failure is logged and leaves the list empty.
pub fn load_or_empty(source: &str) -> Vec<Record> {
    match load_records(source) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(source, "failed to load records: {e}");
            Vec::new()
        }
    }
}

fn read_local(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    parse_feed(&content)
}

/// The feed must be a JSON array. Each entry converts on its own; an entry
/// without a usable integer ID is logged and skipped, the rest still load.
fn parse_feed(body: &str) -> Result<Vec<Record>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = entries.len();
    let records: Vec<Record> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<Record>(entry) {
            Ok(rec) => Some(rec),
            Err(e) => {
                tracing::warn!(index = idx, "skipping feed entry: {e}");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!(skipped = total - records.len(), total, "some feed entries were skipped");
    }
    Ok(records)
}

#[cfg(feature = "remote")]
fn fetch_remote(url: &str) -> Result<Vec<Record>> {
    let resp = reqwest::blocking::get(url)?;
    if !resp.status().is_success() {
        return Err(DeskError::HttpStatus {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    let body = resp.text()?;
    parse_feed(&body)
}

#[cfg(not(feature = "remote"))]
fn fetch_remote(url: &str) -> Result<Vec<Record>> {
    Err(DeskError::Other(format!(
        "cannot fetch {url}: built without the 'remote' feature"
    )))
}
