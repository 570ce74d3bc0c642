use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::{Record, RejectionReason, CATEGORY_LABELS, STATUS_LABELS};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Parse the date forms the feed is known to carry. The calendar date is taken
/// as written; offsets on full timestamps are not normalized.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Zero-based calendar month (0 = January) of an upload date.
pub fn upload_month(raw: &str) -> Option<usize> {
    parse_date(raw).map(|d| d.month0() as usize)
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// 12 months × 3 rejection reasons, dense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlySeries {
    cells: [[usize; 3]; 12],
}

impl MonthlySeries {
    pub fn add(&mut self, month: usize, reason: RejectionReason) {
        if let Some(row) = self.cells.get_mut(month) {
            row[reason.index()] += 1;
        }
    }

    /// Count for a month (0-11) and reason index (0-2). Out-of-range is zero.
    pub fn get(&self, month: usize, reason: usize) -> usize {
        self.cells
            .get(month)
            .and_then(|row| row.get(reason))
            .copied()
            .unwrap_or(0)
    }

    pub fn reason_series(&self, reason: RejectionReason) -> [usize; 12] {
        let mut out = [0; 12];
        for (m, row) in self.cells.iter().enumerate() {
            out[m] = row[reason.index()];
        }
        out
    }

    pub fn month_total(&self, month: usize) -> usize {
        self.cells.get(month).map(|row| row.iter().sum()).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn max_cell(&self) -> usize {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    /// False for values outside the legend this histogram was built for.
    pub recognized: bool,
}

/// Counts per distinct value, keyed by a fixed legend. Known labels keep their
/// legend position (zero when unseen); any other value gets its own bucket
/// after the legend, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
    first_seen: Vec<usize>,
}

impl Histogram {
    pub fn with_labels(labels: &[&str]) -> Self {
        let mut hist = Self::default();
        for label in labels {
            hist.index.insert(label.to_string(), hist.buckets.len());
            hist.buckets.push(Bucket {
                label: label.to_string(),
                count: 0,
                recognized: true,
            });
        }
        hist
    }

    pub fn record(&mut self, value: &str) {
        let idx = match self.index.get(value) {
            Some(&i) => i,
            None => {
                let i = self.buckets.len();
                self.index.insert(value.to_string(), i);
                self.buckets.push(Bucket {
                    label: value.to_string(),
                    count: 0,
                    recognized: false,
                });
                i
            }
        };
        if self.buckets[idx].count == 0 {
            self.first_seen.push(idx);
        }
        self.buckets[idx].count += 1;
    }

    /// Legend buckets first, then unrecognized ones.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn count(&self, label: &str) -> usize {
        self.index
            .get(label)
            .map(|&i| self.buckets[i].count)
            .unwrap_or(0)
    }

    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Distinct observed values with their counts, in first-seen order.
    pub fn observed(&self) -> Vec<(&str, usize)> {
        self.first_seen
            .iter()
            .map(|&i| (self.buckets[i].label.as_str(), self.buckets[i].count))
            .collect()
    }

    pub fn unrecognized(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter().filter(|b| !b.recognized)
    }

    pub fn has_unrecognized(&self) -> bool {
        self.unrecognized().next().is_some()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Summary {
    pub monthly: MonthlySeries,
    pub status: Histogram,
    pub categories: Histogram,
    pub total: usize,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            monthly: MonthlySeries::default(),
            status: Histogram::with_labels(STATUS_LABELS),
            categories: Histogram::with_labels(CATEGORY_LABELS),
            total: 0,
        }
    }
}

/// Derive the chart datasets from the record list in a single pass.
pub fn summarize(records: &[Record]) -> Summary {
    let mut summary = Summary::default();
    for rec in records {
        if let (Some(month), Some(reason)) = (
            upload_month(&rec.upload_date),
            RejectionReason::from_label(&rec.rejection_reason),
        ) {
            summary.monthly.add(month, reason);
        }
        summary.status.record(&rec.status);
        summary.categories.record(&rec.category);
    }
    summary.total = records.len();
    summary
}
