use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::storage::entities::WeekStart;

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub const DATE_HELP: &str = "Any day of the week. Examples are \"today\", \"last monday\", \"15/03/2025\". Defaults to the current week";

/// Parses a user supplied date. `None` falls back to `now`.
pub fn parse_day(value: Option<&str>, style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    match value.map(|s| parse_date_string(s, now, style.into())) {
        Some(Ok(v)) => Ok(v.date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

/// The week the user asked for. Normalizing to Monday happens here, before anything touches the
/// store.
pub fn parse_week(value: Option<&str>, style: DateStyle, now: DateTime<Local>) -> Result<WeekStart> {
    Ok(WeekStart::containing(parse_day(value, style, now)?)?)
}
