use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::Result;
use crate::models::{Record, CATEGORY_LABELS};
use crate::settings::{load_settings, save_settings, DATASET_FILE};

const RECORD_COUNT: usize = 36;

const ISSUES: &[&str] = &[
    "Missing signature",
    "Blurred scan",
    "Expired document",
    "Name mismatch",
    "Address mismatch",
];

/// Two trailing entries fall outside the tracked reason list on purpose.
const REASONS: &[&str] = &[
    "Non-compliance",
    "Invalid Entry",
    "Incomplete Data",
    "Invalid Entry",
    "Non-compliance",
    "Duplicate Upload",
    "",
];

const DECISIONS: &[&str] = &["Pending", "Accept", "Reject", "Pending"];

fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    (1..=day)
        .rev()
        .find(|d| NaiveDate::from_ymd_opt(year, month, *d).is_some())
        .unwrap_or(1)
}

pub fn generate_records(year: i32) -> Vec<Record> {
    (0..RECORD_COUNT)
        .map(|i| {
            let month = (i % 12) as u32 + 1;
            let day = clamp_day(year, month, (i as u32 * 7) % 28 + 1);
            let uploaded = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN);
            let complete = i % 3 != 0;
            let completed = if complete {
                (uploaded + Duration::days((i % 9) as i64 + 1))
                    .format("%Y-%m-%d")
                    .to_string()
            } else {
                String::new()
            };
            let id = i as i64 + 1;
            Record {
                id,
                account_number: format!("ACC-{:05}", 10_000 + id * 37),
                upload_date: uploaded.format("%Y-%m-%d").to_string(),
                completion_date: completed,
                status: if complete { "Complete" } else { "Pending" }.to_string(),
                category: CATEGORY_LABELS[i % CATEGORY_LABELS.len()].to_string(),
                issue_type: ISSUES[i % ISSUES.len()].to_string(),
                rejection_reason: REASONS[i % REASONS.len()].to_string(),
                report_path: if i % 4 == 3 {
                    String::new()
                } else {
                    format!("/reports/{id}.pdf")
                },
                review_decision: DECISIONS[i % DECISIONS.len()].to_string(),
            }
        })
        .collect()
}

pub fn write_dataset(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn run() -> Result<()> {
    let mut settings = load_settings();
    let path = PathBuf::from(&settings.data_dir).join(DATASET_FILE);
    let records = generate_records(Local::now().year());
    write_dataset(&path, &records)?;

    settings.data_source = path.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Wrote {} sample records to {}", records.len(), path.display());
    println!("Run `reviewdesk` to open the dashboard.");
    Ok(())
}
