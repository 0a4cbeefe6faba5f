use std::{fmt::Display, ops::RangeInclusive};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{RosterError, WeekStartError},
    utils::time::{date_to_record_name, monday_of},
};

const SUPPORTED_YEARS: RangeInclusive<i32> = 0..=9999;

/// Monday identifying a tracking week. Can't be constructed from any other weekday, or from a
/// year that doesn't fit in four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    pub fn new(date: NaiveDate) -> Result<Self, WeekStartError> {
        if date.weekday() != Weekday::Mon {
            Err(WeekStartError::NotMonday(date))
        } else if !SUPPORTED_YEARS.contains(&date.year()) {
            Err(WeekStartError::OutOfRange(date))
        } else {
            Ok(Self(date))
        }
    }

    /// Week that contains `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, WeekStartError> {
        Self::new(monday_of(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Calendar date of `day` within this week.
    pub fn date_of(&self, day: WorkDay) -> NaiveDate {
        self.0 + Duration::days(day.offset())
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", date_to_record_name(self.0))
    }
}

/// The five tracked days of a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize)]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 5] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkDay::Monday => "Monday",
            WorkDay::Tuesday => "Tuesday",
            WorkDay::Wednesday => "Wednesday",
            WorkDay::Thursday => "Thursday",
            WorkDay::Friday => "Friday",
        }
    }

    /// Days since Monday.
    pub fn offset(&self) -> i64 {
        match self {
            WorkDay::Monday => 0,
            WorkDay::Tuesday => 1,
            WorkDay::Wednesday => 2,
            WorkDay::Thursday => 3,
            WorkDay::Friday => 4,
        }
    }
}

impl Display for WorkDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Metric {
    Calls,
    Emails,
    Contacts,
    Responses,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Calls,
        Metric::Emails,
        Metric::Contacts,
        Metric::Responses,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Calls => "Calls",
            Metric::Emails => "Emails",
            Metric::Contacts => "Contacts",
            Metric::Responses => "Responses",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Counts entered for one day. `None` means nothing was entered yet, which is different from an
/// explicit zero while editing but counts as zero in every calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub calls: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub emails: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub contacts: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub responses: Option<u32>,
}

impl DailyEntry {
    pub fn get(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::Calls => self.calls,
            Metric::Emails => self.emails,
            Metric::Contacts => self.contacts,
            Metric::Responses => self.responses,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<u32>) {
        let slot = match metric {
            Metric::Calls => &mut self.calls,
            Metric::Emails => &mut self.emails,
            Metric::Contacts => &mut self.contacts,
            Metric::Responses => &mut self.responses,
        };
        *slot = value;
    }

    pub fn count(&self, metric: Metric) -> u32 {
        self.get(metric).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|metric| self.get(*metric).is_none())
    }
}

/// Editing leaves empty strings behind, those are read back as "not entered".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Count(u32),
        Text(String),
    }

    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCount::Count(v)) => Ok(Some(v)),
        Some(RawCount::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawCount::Text(text)) => Err(serde::de::Error::custom(format!(
            "expected a count or an empty string, got {text:?}"
        ))),
    }
}

/// One representative's numbers for one week, stored as a single blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeekRecord {
    #[serde(default, skip_serializing_if = "DailyEntry::is_empty")]
    pub monday: DailyEntry,
    #[serde(default, skip_serializing_if = "DailyEntry::is_empty")]
    pub tuesday: DailyEntry,
    #[serde(default, skip_serializing_if = "DailyEntry::is_empty")]
    pub wednesday: DailyEntry,
    #[serde(default, skip_serializing_if = "DailyEntry::is_empty")]
    pub thursday: DailyEntry,
    #[serde(default, skip_serializing_if = "DailyEntry::is_empty")]
    pub friday: DailyEntry,
}

impl WeekRecord {
    pub fn day(&self, day: WorkDay) -> &DailyEntry {
        match day {
            WorkDay::Monday => &self.monday,
            WorkDay::Tuesday => &self.tuesday,
            WorkDay::Wednesday => &self.wednesday,
            WorkDay::Thursday => &self.thursday,
            WorkDay::Friday => &self.friday,
        }
    }

    pub fn day_mut(&mut self, day: WorkDay) -> &mut DailyEntry {
        match day {
            WorkDay::Monday => &mut self.monday,
            WorkDay::Tuesday => &mut self.tuesday,
            WorkDay::Wednesday => &mut self.wednesday,
            WorkDay::Thursday => &mut self.thursday,
            WorkDay::Friday => &mut self.friday,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (WorkDay, &DailyEntry)> {
        WorkDay::ALL.into_iter().map(|day| (day, self.day(day)))
    }
}

/// Targets the progress is measured against. Weekly targets for everything except contacts are
/// derived from the daily ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalConfig {
    pub calls_daily: u32,
    pub emails_daily: u32,
    pub contacts_daily: u32,
    pub responses_daily: u32,
    pub contacts_weekly: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            calls_daily: 50,
            emails_daily: 30,
            contacts_daily: 10,
            responses_daily: 5,
            contacts_weekly: 20,
        }
    }
}

impl GoalConfig {
    pub fn daily(&self, metric: Metric) -> u32 {
        match metric {
            Metric::Calls => self.calls_daily,
            Metric::Emails => self.emails_daily,
            Metric::Contacts => self.contacts_daily,
            Metric::Responses => self.responses_daily,
        }
    }
}

/// Ordered list of tracked representatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Roster(Vec<String>);

impl Default for Roster {
    fn default() -> Self {
        Self(vec!["Rep 1".into(), "Rep 2".into(), "Rep 3".into()])
    }
}

impl From<Vec<String>> for Roster {
    fn from(names: Vec<String>) -> Self {
        let mut roster = Roster(Vec::with_capacity(names.len()));
        for name in names {
            if !roster.contains(&name) {
                roster.0.push(name);
            }
        }
        roster
    }
}

impl From<Roster> for Vec<String> {
    fn from(value: Roster) -> Self {
        value.0
    }
}

impl Roster {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|v| v == name)
    }

    /// Appends a trimmed name. Returns the name as it was stored.
    pub fn add(&mut self, name: &str) -> Result<String, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::Empty);
        }
        if self.contains(name) {
            return Err(RosterError::Duplicate(name.to_string()));
        }
        self.0.push(name.to_string());
        Ok(name.to_string())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != name);
        before != self.0.len()
    }
}
