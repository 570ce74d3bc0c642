use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use crate::error::{DeskError, Result};
use crate::models::ReviewDecision;
use crate::session::{DashboardSession, SortColumn, TableSort};

pub fn run(source: Option<&str>, sort: &str, desc: bool, decision: Option<&str>) -> Result<()> {
    let column = SortColumn::from_key(sort)
        .ok_or_else(|| DeskError::Other(format!("Unknown sort column: {sort}")))?;
    let only = decision.map(ReviewDecision::parse).transpose()?;
    let session = DashboardSession::load(super::load_from(source)?);
    let table = record_table(&session, TableSort { column, descending: desc }, only);
    if table.row_iter().count() == 0 {
        println!("No records found.");
        return Ok(());
    }
    println!("{}\n{table}", "Records".bold());
    Ok(())
}

fn decision_color(decision: ReviewDecision) -> Color {
    match decision {
        ReviewDecision::Accept => Color::Green,
        ReviewDecision::Reject => Color::Red,
        ReviewDecision::Pending => Color::Grey,
    }
}

pub fn record_table(
    session: &DashboardSession,
    sort: TableSort,
    only: Option<ReviewDecision>,
) -> Table {
    let mut table = Table::new();
    let mut header: Vec<&str> = SortColumn::ALL.iter().map(|c| c.label()).collect();
    header.push("Report");
    table.set_header(header);
    for rec in session.sorted(sort) {
        let decision = session.decision(rec.id);
        if only.is_some_and(|d| d != decision) {
            continue;
        }
        table.add_row(vec![
            Cell::new(rec.id),
            Cell::new(&rec.account_number),
            Cell::new(&rec.upload_date),
            Cell::new(&rec.completion_date),
            Cell::new(&rec.status),
            Cell::new(&rec.category),
            Cell::new(&rec.issue_type),
            Cell::new(&rec.rejection_reason),
            Cell::new(decision.label()).fg(decision_color(decision)),
            Cell::new(if rec.has_report() { rec.report_path.as_str() } else { "\u{2014}" }),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_record_table_follows_sort() {
        let records: Vec<Record> = serde_json::from_value(serde_json::json!([
            {"ID": 1, "Account Number": "ZZ-1", "Accept/Reject": "Accept"},
            {"ID": 2, "Account Number": "AA-2", "Accept/Reject": "Reject"}
        ]))
        .unwrap();
        let session = DashboardSession::load(records);
        let text = record_table(
            &session,
            TableSort { column: SortColumn::AccountNumber, descending: false },
            None,
        )
        .to_string();
        let aa = text.find("AA-2").unwrap();
        let zz = text.find("ZZ-1").unwrap();
        assert!(aa < zz);
        assert!(text.contains("Accept/Reject"));
        assert!(text.contains("Reject"));
    }

    #[test]
    fn test_record_table_decision_filter() {
        let records: Vec<Record> = serde_json::from_value(serde_json::json!([
            {"ID": 1, "Account Number": "ZZ-1", "Accept/Reject": "Accept"},
            {"ID": 2, "Account Number": "AA-2", "Accept/Reject": "Reject"}
        ]))
        .unwrap();
        let session = DashboardSession::load(records);
        let table = record_table(&session, TableSort::default(), Some(ReviewDecision::Reject));
        assert_eq!(table.row_iter().count(), 1);
        let text = table.to_string();
        assert!(text.contains("AA-2"));
        assert!(!text.contains("ZZ-1"));
    }
}
