use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DeskError, Result};

/// Legend for the status chart, in display order.
pub const STATUS_LABELS: &[&str] = &["Pending", "Complete"];

/// Legend for the category chart, in display order.
pub const CATEGORY_LABELS: &[&str] = &[
    "Bank Statements",
    "Utilities Bill",
    "Tenancy Agreement",
    "Other",
];

/// One reviewed-document entry as served by the record feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ID", deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(rename = "Account Number", default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(rename = "Upload Date", default, deserialize_with = "lenient_string")]
    pub upload_date: String,
    #[serde(rename = "Completion Date", default, deserialize_with = "lenient_string")]
    pub completion_date: String,
    #[serde(rename = "Status", default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "Categories", default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(rename = "Type of Issue", default, deserialize_with = "lenient_string")]
    pub issue_type: String,
    #[serde(rename = "Rejection Reason", default, deserialize_with = "lenient_string")]
    pub rejection_reason: String,
    #[serde(rename = "Report", default, deserialize_with = "lenient_string")]
    pub report_path: String,
    #[serde(rename = "Accept/Reject", default, deserialize_with = "lenient_string")]
    pub review_decision: String,
}

/// Feed fields are loosely typed: null reads as blank, numbers and booleans
/// as their text. Arrays and objects carry nothing displayable and read as blank.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Integer ids, also accepted as numeric strings.
fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("ID {n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("ID {s:?} is not an integer"))),
        other => Err(D::Error::custom(format!("ID {other} is not an integer"))),
    }
}

impl Record {
    pub fn has_report(&self) -> bool {
        !self.report_path.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReviewDecision {
    #[default]
    Pending,
    Accept,
    Reject,
}

impl ReviewDecision {
    pub const ALL: [ReviewDecision; 3] = [Self::Pending, Self::Accept, Self::Reject];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accept => "Accept",
            Self::Reject => "Reject",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }

    /// Strict variant of `from_label` for user-supplied input.
    pub fn parse(label: &str) -> Result<Self> {
        Self::from_label(label).ok_or_else(|| DeskError::InvalidDecision(label.to_string()))
    }

    pub fn cycle_next(self) -> Self {
        match self {
            Self::Pending => Self::Accept,
            Self::Accept => Self::Reject,
            Self::Reject => Self::Pending,
        }
    }

    pub fn cycle_prev(self) -> Self {
        match self {
            Self::Pending => Self::Reject,
            Self::Accept => Self::Pending,
            Self::Reject => Self::Accept,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NonCompliance,
    InvalidEntry,
    IncompleteData,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 3] = [
        Self::NonCompliance,
        Self::InvalidEntry,
        Self::IncompleteData,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::NonCompliance => "Non-compliance",
            Self::InvalidEntry => "Invalid Entry",
            Self::IncompleteData => "Incomplete Data",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::NonCompliance => 0,
            Self::InvalidEntry => 1,
            Self::IncompleteData => 2,
        }
    }

    /// Exact, case-sensitive match. Anything else is not a tracked reason.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label() == label)
    }
}
