use std::cmp::Ordering;

use crate::aggregate::{parse_date, summarize, Summary};
use crate::error::{DeskError, Result};
use crate::models::{Record, ReviewDecision};
use crate::status_map::StatusMap;
use crate::viewer::ReportViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    AccountNumber,
    UploadDate,
    CompletionDate,
    Status,
    Category,
    IssueType,
    RejectionReason,
    Decision,
}

impl SortColumn {
    pub const ALL: [SortColumn; 9] = [
        Self::Id,
        Self::AccountNumber,
        Self::UploadDate,
        Self::CompletionDate,
        Self::Status,
        Self::Category,
        Self::IssueType,
        Self::RejectionReason,
        Self::Decision,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::AccountNumber => "Account Number",
            Self::UploadDate => "Upload Date",
            Self::CompletionDate => "Completion Date",
            Self::Status => "Status",
            Self::Category => "Categories",
            Self::IssueType => "Type of Issue",
            Self::RejectionReason => "Rejection Reason",
            Self::Decision => "Accept/Reject",
        }
    }

    /// Command-line key, e.g. `upload-date`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::AccountNumber => "account",
            Self::UploadDate => "upload-date",
            Self::CompletionDate => "completion-date",
            Self::Status => "status",
            Self::Category => "category",
            Self::IssueType => "issue",
            Self::RejectionReason => "reason",
            Self::Decision => "decision",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSort {
    pub column: SortColumn,
    pub descending: bool,
}

/// Unparseable dates sort after every real one.
fn cmp_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn decision_rank(d: ReviewDecision) -> u8 {
    match d {
        ReviewDecision::Pending => 0,
        ReviewDecision::Accept => 1,
        ReviewDecision::Reject => 2,
    }
}

/// Page state for one loaded dataset. Everything here is discarded on reload.
#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    records: Vec<Record>,
    summary: Summary,
    statuses: StatusMap,
    viewer: ReportViewer,
}

impl DashboardSession {
    /// Aggregate and seed in one step, right after the records arrive.
    pub fn load(records: Vec<Record>) -> Self {
        let summary = summarize(&records);
        let statuses = StatusMap::seed(&records);
        Self {
            records,
            summary,
            statuses,
            viewer: ReportViewer::default(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    pub fn viewer(&self) -> &ReportViewer {
        &self.viewer
    }

    pub fn record(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn decision(&self, id: i64) -> ReviewDecision {
        self.statuses.get(id)
    }

    pub fn set_status(&mut self, id: i64, decision: ReviewDecision) -> Result<()> {
        if self.record(id).is_none() {
            return Err(DeskError::UnknownRecord(id));
        }
        self.statuses.set(id, decision);
        Ok(())
    }

    pub fn open_report(&mut self, id: i64) -> Result<()> {
        let rec = self.record(id).ok_or(DeskError::UnknownRecord(id))?;
        if !rec.has_report() {
            return Err(DeskError::NoReport(id));
        }
        let path = rec.report_path.clone();
        self.viewer.open(&path)
    }

    pub fn close_report(&mut self) {
        self.viewer.close();
    }

    /// Records in table order. Ties fall back to id so the order is stable.
    pub fn sorted(&self, sort: TableSort) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().collect();
        rows.sort_by(|a, b| {
            let ord = match sort.column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::AccountNumber => a.account_number.cmp(&b.account_number),
                SortColumn::UploadDate => cmp_dates(&a.upload_date, &b.upload_date),
                SortColumn::CompletionDate => cmp_dates(&a.completion_date, &b.completion_date),
                SortColumn::Status => a.status.cmp(&b.status),
                SortColumn::Category => a.category.cmp(&b.category),
                SortColumn::IssueType => a.issue_type.cmp(&b.issue_type),
                SortColumn::RejectionReason => a.rejection_reason.cmp(&b.rejection_reason),
                SortColumn::Decision => {
                    decision_rank(self.statuses.get(a.id)).cmp(&decision_rank(self.statuses.get(b.id)))
                }
            };
            let ord = if sort.descending { ord.reverse() } else { ord };
            ord.then_with(|| a.id.cmp(&b.id))
        });
        rows
    }
}
