use std::collections::HashMap;

use crate::models::{Record, ReviewDecision};

/// In-memory record id → review decision. Lives for one dashboard session.
#[derive(Debug, Clone, Default)]
pub struct StatusMap {
    entries: HashMap<i64, ReviewDecision>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionTally {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl StatusMap {
    /// Build the map from each record's initial decision in one batch.
    pub fn seed(records: &[Record]) -> Self {
        let entries = records
            .iter()
            .map(|rec| {
                let decision = ReviewDecision::from_label(&rec.review_decision).unwrap_or_else(|| {
                    tracing::warn!(
                        id = rec.id,
                        decision = %rec.review_decision,
                        "unrecognized review decision, seeding as Pending"
                    );
                    ReviewDecision::Pending
                });
                (rec.id, decision)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: i64) -> ReviewDecision {
        self.entries.get(&id).copied().unwrap_or_default()
    }

    /// Replace the decision for one id. Last write wins.
    pub fn set(&mut self, id: i64, decision: ReviewDecision) {
        self.entries.insert(id, decision);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tally(&self) -> DecisionTally {
        let mut tally = DecisionTally::default();
        for decision in self.entries.values() {
            match decision {
                ReviewDecision::Pending => tally.pending += 1,
                ReviewDecision::Accept => tally.accepted += 1,
                ReviewDecision::Reject => tally.rejected += 1,
            }
        }
        tally
    }
}
