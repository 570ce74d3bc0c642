use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use serde_json::json;

use crate::aggregate::{summarize, Histogram, Summary, MONTH_LABELS};
use crate::error::Result;
use crate::fmt::{display_label, number, percent};
use crate::models::RejectionReason;

pub fn run(source: Option<&str>, json: bool) -> Result<()> {
    let records = super::load_from(source)?;
    let summary = summarize(&records);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
    } else {
        println!("{}", format_summary(&summary));
    }
    Ok(())
}

/// The chart datasets as JSON: one 12-month series per reason and, for each
/// histogram, the legend counts plus the values in first-seen order.
pub fn summary_json(summary: &Summary) -> serde_json::Value {
    let monthly: serde_json::Map<String, serde_json::Value> = RejectionReason::ALL
        .iter()
        .map(|r| (r.label().to_string(), json!(summary.monthly.reason_series(*r))))
        .collect();
    json!({
        "total": summary.total,
        "months": MONTH_LABELS,
        "monthly": monthly,
        "status": histogram_json(&summary.status),
        "categories": histogram_json(&summary.categories),
    })
}

fn histogram_json(hist: &Histogram) -> serde_json::Value {
    let labels: Vec<&str> = hist.buckets().iter().map(|b| b.label.as_str()).collect();
    json!({
        "labels": labels,
        "counts": hist.counts(),
        "observed": hist.observed(),
    })
}

pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} ({} with a tracked rejection reason)\n\n",
        "Total records:".bold(),
        number(summary.total),
        number(summary.monthly.total())
    ));
    out.push_str(&format!("{}\n{}\n\n", "Rejection reasons by month".bold(), monthly_table(summary)));
    out.push_str(&format!(
        "{}\n{}\n\n",
        "Status".bold(),
        histogram_table("Status", &summary.status, summary.total)
    ));
    out.push_str(&format!(
        "{}\n{}",
        "Categories".bold(),
        histogram_table("Category", &summary.categories, summary.total)
    ));

    let unknown: Vec<String> = summary
        .status
        .unrecognized()
        .chain(summary.categories.unrecognized())
        .map(|b| format!("\"{}\"", b.label))
        .collect();
    if summary.status.has_unrecognized() || summary.categories.has_unrecognized() {
        out.push_str(&format!(
            "\n\n{} values outside the legend: {}",
            "Note:".yellow(),
            unknown.join(", ")
        ));
    }
    out
}

fn monthly_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    let mut header = vec!["Month".to_string()];
    header.extend(RejectionReason::ALL.iter().map(|r| r.label().to_string()));
    header.push("Total".to_string());
    table.set_header(header);

    for (m, label) in MONTH_LABELS.iter().enumerate() {
        let mut row = vec![Cell::new(label)];
        for reason in RejectionReason::ALL {
            row.push(Cell::new(summary.monthly.get(m, reason.index())).set_alignment(CellAlignment::Right));
        }
        row.push(Cell::new(summary.monthly.month_total(m)).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }
    table
}

fn histogram_table(title: &str, hist: &Histogram, total: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![title, "Count", "Share"]);
    for bucket in hist.buckets() {
        let label = if bucket.recognized {
            display_label(&bucket.label).to_string()
        } else {
            format!("{} (unrecognized)", display_label(&bucket.label))
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(number(bucket.count)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}%", percent(bucket.count, total))).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn records() -> Vec<Record> {
        serde_json::from_value(serde_json::json!([
            {"ID": 1, "Upload Date": "2024-01-15", "Rejection Reason": "Invalid Entry",
             "Status": "Pending", "Categories": "Other"},
            {"ID": 2, "Upload Date": "2024-01-20", "Rejection Reason": "Invalid Entry",
             "Status": "Escalated", "Categories": "Other"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_format_summary_lists_everything() {
        colored::control::set_override(false);
        let text = format_summary(&summarize(&records()));
        assert!(text.contains("Total records: 2"));
        assert!(text.contains("Non-compliance"));
        assert!(text.contains("Dec"));
        assert!(text.contains("Escalated (unrecognized)"));
        assert!(text.contains("Tenancy Agreement"));
        assert!(text.contains("100%"));
        assert!(text.contains("values outside the legend: \"Escalated\""));
    }

    #[test]
    fn test_summary_json_datasets() {
        let value = summary_json(&summarize(&records()));
        assert_eq!(value["total"], 2);
        assert_eq!(value["monthly"]["Invalid Entry"][0], 2);
        assert_eq!(value["monthly"]["Non-compliance"][0], 0);
        assert_eq!(value["status"]["labels"], json!(["Pending", "Complete", "Escalated"]));
        assert_eq!(value["status"]["counts"], json!([1, 0, 1]));
        assert_eq!(value["status"]["observed"], json!([["Pending", 1], ["Escalated", 1]]));
        assert_eq!(value["categories"]["observed"], json!([["Other", 2]]));
    }

    #[test]
    fn test_format_summary_empty() {
        colored::control::set_override(false);
        let text = format_summary(&summarize(&[]));
        assert!(text.contains("Total records: 0"));
        assert!(!text.contains("unrecognized"));
    }
}
