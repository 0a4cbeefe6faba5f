use chrono::{Datelike, Duration, NaiveDate};

/// This is the standard way of converting a date to a string in sales-tracker. Used both for
/// storage keys and for exported dates.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns the Monday of the week containing `date`. Sunday belongs to the week that started 6
/// days before it.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    use super::{date_to_record_name, monday_of};

    #[test]
    fn test_record_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_to_record_name(date), "2024-03-05");
    }

    #[test]
    fn test_monday_of_sunday_rolls_back_six_days() {
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(monday_of(sunday), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_monday_of_crosses_year_boundary() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            monday_of(wednesday),
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
        );
    }

    #[test]
    fn test_monday_of_is_idempotent_and_week_stable() {
        let mut date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        while date < end {
            let monday = monday_of(date);
            assert_eq!(monday.weekday(), Weekday::Mon);
            assert_eq!(monday_of(monday), monday);
            for offset in 0..7 {
                assert_eq!(monday_of(monday + Duration::days(offset)), monday);
            }
            date += Duration::days(1);
        }
    }
}
