//! Addressing of week records inside a flat key-value store.
//!
//! A key looks like `week-2024-01-01-Rep Name`. The three date components are taken
//! positionally and everything after them is the representative, so names containing `-` survive
//! a round trip.

use chrono::NaiveDate;

use crate::{error::KeyDecodeError, utils::time::date_to_record_name};

use super::entities::WeekStart;

pub const WEEK_KEY_PREFIX: &str = "week-";
const SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeekKey {
    pub week_start: WeekStart,
    pub rep: String,
}

impl WeekKey {
    pub fn new(week_start: WeekStart, rep: impl Into<String>) -> Self {
        Self {
            week_start,
            rep: rep.into(),
        }
    }

    pub fn encode(&self) -> String {
        encode(self.week_start, &self.rep)
    }

    pub fn decode(key: &str) -> Result<Self, KeyDecodeError> {
        decode(key)
    }
}

pub fn encode(week_start: WeekStart, rep: &str) -> String {
    format!(
        "{WEEK_KEY_PREFIX}{}{SEPARATOR}{rep}",
        date_to_record_name(week_start.date())
    )
}

pub fn decode(key: &str) -> Result<WeekKey, KeyDecodeError> {
    let Some(rest) = key.strip_prefix(WEEK_KEY_PREFIX) else {
        return Err(KeyDecodeError::NotAWeekKey);
    };

    let malformed = |reason: String| KeyDecodeError::Malformed {
        key: key.to_string(),
        reason,
    };

    let mut parts = rest.splitn(4, SEPARATOR);
    let (Some(year), Some(month), Some(day), Some(rep)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed("expected year, month, day and name".into()));
    };

    let date = parse_date_parts(year, month, day).ok_or_else(|| {
        malformed(format!("{year}-{month}-{day} is not a valid date"))
    })?;
    let week_start = WeekStart::new(date).map_err(|e| malformed(e.to_string()))?;

    Ok(WeekKey::new(week_start, rep))
}

/// Strict `YYYY-MM-DD`. chrono's parser accepts things like `2024-1-1` which would not survive
/// being encoded again.
fn parse_date_parts(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let digits = |v: &str, len: usize| v.len() == len && v.bytes().all(|b| b.is_ascii_digit());
    if !(digits(year, 4) && digits(month, 2) && digits(day, 2)) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::{error::KeyDecodeError, storage::entities::WeekStart};

    use super::{decode, encode, WeekKey};

    fn monday(y: i32, m: u32, d: u32) -> WeekStart {
        WeekStart::new(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_format() {
        assert_eq!(encode(monday(2024, 1, 1), "Ana"), "week-2024-01-01-Ana");
    }

    #[test]
    fn test_round_trip_awkward_names() {
        let names = [
            "Ana",
            "",
            "Mary-Jane",
            "-",
            "--leading",
            "trailing-",
            "2024-01-08",
            "12345",
            "week-2024-01-01-Ana",
            "José Ñúñez",
        ];
        let mut week = monday(2023, 12, 25);
        for _ in 0..60 {
            for name in names {
                let key = encode(week, name);
                assert_eq!(decode(&key), Ok(WeekKey::new(week, name)), "{key}");
            }
            week = WeekStart::new(week.date() + Duration::weeks(1)).unwrap();
        }
    }

    #[test]
    fn test_round_trip_at_year_limits() {
        for week in [monday(0, 1, 3), monday(9999, 12, 27)] {
            let key = encode(week, "Ana");
            assert_eq!(decode(&key), Ok(WeekKey::new(week, "Ana")), "{key}");
        }
        assert_eq!(encode(monday(0, 1, 3), "Ana"), "week-0000-01-03-Ana");
    }

    #[test]
    fn test_prefix_collisions_stay_distinct() {
        let week = monday(2024, 1, 1);
        let short = encode(week, "A");
        let long = encode(week, "A-B");
        assert_ne!(short, long);
        assert_eq!(decode(&short).unwrap().rep, "A");
        assert_eq!(decode(&long).unwrap().rep, "A-B");
    }

    #[test]
    fn test_singletons_are_not_week_keys() {
        for key in ["tracker-goals", "tracker-reps", "tracker-logo", "weekly", ""] {
            assert_eq!(decode(key), Err(KeyDecodeError::NotAWeekKey));
        }
    }

    #[test]
    fn test_malformed_week_keys() {
        for key in [
            "week-2024-01-01",
            "week-2024-13-01-Ana",
            "week-2024-1-1-Ana",
            "week-abcd-01-01-Ana",
            "week-2024-01-02-Ana",
            "week-",
        ] {
            assert!(
                matches!(decode(key), Err(KeyDecodeError::Malformed { .. })),
                "{key}"
            );
        }
    }
}
