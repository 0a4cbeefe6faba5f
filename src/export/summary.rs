use std::collections::HashMap;

use serde::Serialize;

use crate::progress::MetricTotals;

use super::ExportRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepSummary {
    #[serde(rename = "Sales Rep")]
    pub rep: String,
    #[serde(rename = "Total Calls")]
    pub total_calls: u64,
    #[serde(rename = "Total Emails")]
    pub total_emails: u64,
    #[serde(rename = "Total Contacts")]
    pub total_contacts: u64,
    #[serde(rename = "Total Responses")]
    pub total_responses: u64,
    #[serde(rename = "Days Tracked")]
    pub days_tracked: u32,
}

impl RepSummary {
    fn new(rep: String) -> Self {
        Self {
            rep,
            total_calls: 0,
            total_emails: 0,
            total_contacts: 0,
            total_responses: 0,
            days_tracked: 0,
        }
    }

    fn add(&mut self, totals: MetricTotals) {
        self.total_calls = self.total_calls.saturating_add(totals.calls);
        self.total_emails = self.total_emails.saturating_add(totals.emails);
        self.total_contacts = self.total_contacts.saturating_add(totals.contacts);
        self.total_responses = self.total_responses.saturating_add(totals.responses);
        self.days_tracked = self.days_tracked.saturating_add(1);
    }
}

/// Returns one summary per representative, ordered by where each representative first shows up
/// in `rows`.
pub fn summarize_reps(rows: &[ExportRow]) -> Vec<RepSummary> {
    let mut positions = HashMap::<&str, usize>::new();
    let mut summaries = Vec::<RepSummary>::new();

    for row in rows {
        let index = *positions.entry(row.rep.as_str()).or_insert_with(|| {
            summaries.push(RepSummary::new(row.rep.clone()));
            summaries.len() - 1
        });
        summaries[index].add(row.totals());
    }

    summaries
}
