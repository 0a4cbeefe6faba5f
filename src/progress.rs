//! Goal evaluation for a single week or day.

use std::ops::AddAssign;

use crate::{
    storage::entities::{DailyEntry, GoalConfig, Metric, WeekRecord},
    utils::percentage::Percentage,
};

/// Number of working days a weekly goal is made of.
pub const WORK_DAYS_PER_WEEK: u32 = 5;

/// Threshold at which a metric is shown as close to its goal.
const CLOSE_THRESHOLD: f64 = 80.;

/// Sums of counts. Wider than a single count so adding up stored values can't overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricTotals {
    pub calls: u64,
    pub emails: u64,
    pub contacts: u64,
    pub responses: u64,
}

impl MetricTotals {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Calls => self.calls,
            Metric::Emails => self.emails,
            Metric::Contacts => self.contacts,
            Metric::Responses => self.responses,
        }
    }
}

impl From<&DailyEntry> for MetricTotals {
    fn from(entry: &DailyEntry) -> Self {
        Self {
            calls: entry.count(Metric::Calls).into(),
            emails: entry.count(Metric::Emails).into(),
            contacts: entry.count(Metric::Contacts).into(),
            responses: entry.count(Metric::Responses).into(),
        }
    }
}

impl AddAssign for MetricTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.calls = self.calls.saturating_add(rhs.calls);
        self.emails = self.emails.saturating_add(rhs.emails);
        self.contacts = self.contacts.saturating_add(rhs.contacts);
        self.responses = self.responses.saturating_add(rhs.responses);
    }
}

/// Sums every metric over Monday to Friday. Days or metrics that weren't entered count as zero.
pub fn weekly_totals(record: &WeekRecord) -> MetricTotals {
    let mut totals = MetricTotals::default();
    for (_, entry) in record.days() {
        totals += MetricTotals::from(entry);
    }
    totals
}

pub fn daily_percent(value: u32, daily_goal: u32) -> Percentage {
    Percentage::of(value.into(), daily_goal.into())
}

/// Contacts have their own weekly target, the others are five days worth of the daily one.
pub fn weekly_goal(metric: Metric, goals: &GoalConfig) -> u32 {
    match metric {
        Metric::Contacts => goals.contacts_weekly,
        Metric::Calls | Metric::Emails | Metric::Responses => {
            goals.daily(metric).saturating_mul(WORK_DAYS_PER_WEEK)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTier {
    Achieved,
    Close,
    Behind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub metric: Metric,
    pub value: u64,
    pub goal: u32,
    pub percent: Percentage,
}

impl Progress {
    pub fn new(metric: Metric, value: u64, goal: u32) -> Self {
        Self {
            metric,
            value,
            goal,
            percent: Percentage::of(value, goal.into()),
        }
    }

    /// A zero goal is never achieved, 0 out of 0 reads as 0%.
    pub fn achieved(&self) -> bool {
        *self.percent >= 100.
    }

    pub fn bar_fill(&self) -> Percentage {
        self.percent.clamped()
    }

    pub fn tier(&self) -> ProgressTier {
        if self.achieved() {
            ProgressTier::Achieved
        } else if *self.percent >= CLOSE_THRESHOLD {
            ProgressTier::Close
        } else {
            ProgressTier::Behind
        }
    }
}

pub fn week_progress(record: &WeekRecord, goals: &GoalConfig) -> [Progress; 4] {
    let totals = weekly_totals(record);
    Metric::ALL.map(|metric| Progress::new(metric, totals.get(metric), weekly_goal(metric, goals)))
}

pub fn day_progress(entry: &DailyEntry, goals: &GoalConfig) -> [Progress; 4] {
    Metric::ALL.map(|metric| Progress::new(metric, entry.count(metric).into(), goals.daily(metric)))
}
