//! Turns everything stored into the three export sheets: every tracked day, the goals in effect
//! and a rollup per representative.

pub mod spreadsheet;
pub mod summary;

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use spreadsheet::{Sheet, SpreadsheetWriter, Workbook};
use summary::{summarize_reps, RepSummary};
use tracing::{info, instrument};

use crate::{
    error::ExportError,
    progress::MetricTotals,
    storage::{
        entities::{GoalConfig, Metric, WeekRecord, WorkDay},
        kv_store::KeyValueStore,
        record_store::RecordStore,
        week_key::WeekKey,
    },
    utils::time::date_to_record_name,
};

pub const ACTIVITY_SHEET: &str = "Activity Data";
pub const GOALS_SHEET: &str = "Goals";
pub const SUMMARY_SHEET: &str = "Summary by Rep";

/// One tracked day of one representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Sales Rep")]
    pub rep: String,
    #[serde(rename = "Week Starting")]
    pub week_start: NaiveDate,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Day")]
    pub day: WorkDay,
    #[serde(rename = "Calls")]
    pub calls: u32,
    #[serde(rename = "Emails")]
    pub emails: u32,
    #[serde(rename = "Contacts")]
    pub contacts: u32,
    #[serde(rename = "Responses")]
    pub responses: u32,
}

impl ExportRow {
    pub fn totals(&self) -> MetricTotals {
        MetricTotals {
            calls: self.calls.into(),
            emails: self.emails.into(),
            contacts: self.contacts.into(),
            responses: self.responses.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalsSnapshot {
    #[serde(rename = "Daily Calls Goal")]
    pub calls_daily: u32,
    #[serde(rename = "Daily Emails Goal")]
    pub emails_daily: u32,
    #[serde(rename = "Daily Contacts Goal")]
    pub contacts_daily: u32,
    #[serde(rename = "Daily Responses Goal")]
    pub responses_daily: u32,
    #[serde(rename = "Weekly Contacts Goal")]
    pub contacts_weekly: u32,
}

impl From<&GoalConfig> for GoalsSnapshot {
    fn from(goals: &GoalConfig) -> Self {
        Self {
            calls_daily: goals.calls_daily,
            emails_daily: goals.emails_daily,
            contacts_daily: goals.contacts_daily,
            responses_daily: goals.responses_daily,
            contacts_weekly: goals.contacts_weekly,
        }
    }
}

/// One row per weekday, Monday first. Missing numbers become zero here.
pub fn flatten_week<'a>(
    key: &'a WeekKey,
    record: &'a WeekRecord,
) -> impl Iterator<Item = ExportRow> + 'a {
    record.days().map(move |(day, entry)| ExportRow {
        rep: key.rep.clone(),
        week_start: key.week_start.date(),
        date: key.week_start.date_of(day),
        day,
        calls: entry.count(Metric::Calls),
        emails: entry.count(Metric::Emails),
        contacts: entry.count(Metric::Contacts),
        responses: entry.count(Metric::Responses),
    })
}

/// Flattens `weeks` and orders the rows by date. Rows sharing a date keep the order they were
/// found in.
pub fn build_rows(weeks: &[(WeekKey, WeekRecord)]) -> Vec<ExportRow> {
    let mut rows = weeks
        .iter()
        .flat_map(|(key, record)| flatten_week(key, record))
        .collect::<Vec<_>>();
    rows.sort_by_key(|row| row.date);
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub rows: Vec<ExportRow>,
    pub goals: GoalsSnapshot,
    pub summaries: Vec<RepSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: usize,
    pub reps: usize,
}

impl Display for ExportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "✓ Exported {} activity records from {} sales reps!",
            self.rows, self.reps
        )
    }
}

impl ExportBundle {
    pub fn report(&self) -> ExportReport {
        ExportReport {
            rows: self.rows.len(),
            reps: self.summaries.len(),
        }
    }

    /// Sheets in the order they appear in the exported document.
    pub fn workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::default();
        workbook.push(Sheet::from_rows(ACTIVITY_SHEET, &self.rows)?);
        workbook.push(Sheet::from_rows(GOALS_SHEET, &[self.goals])?);
        workbook.push(Sheet::from_rows(SUMMARY_SHEET, &self.summaries)?);
        Ok(workbook)
    }
}

/// Reads every stored week and builds the export views. Fails only when there is nothing at all
/// to export.
#[instrument(skip_all)]
pub fn build_export<S: KeyValueStore>(
    store: &RecordStore<S>,
    goals: &GoalConfig,
) -> Result<ExportBundle, ExportError> {
    let weeks = store.stored_weeks();
    let rows = build_rows(&weeks);
    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let summaries = summarize_reps(&rows);
    info!(
        "Built export with {} rows from {} weeks for {} reps",
        rows.len(),
        weeks.len(),
        summaries.len()
    );
    Ok(ExportBundle {
        rows,
        goals: goals.into(),
        summaries,
    })
}

pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!(
        "Sales_Activity_Export_{}.{extension}",
        date_to_record_name(date)
    )
}

/// Writes `bundle` into `dir` and returns where it ended up.
pub fn write_export(
    bundle: &ExportBundle,
    writer: &dyn SpreadsheetWriter,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date, writer.extension()));
    writer.write(&bundle.workbook()?, &path)?;
    info!("Exported to {path:?}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        error::ExportError,
        storage::{
            entities::{GoalConfig, Metric, WeekRecord, WeekStart, WorkDay},
            kv_store::{KeyValueStore, MemoryStore},
            record_store::{RecordStore, GOALS_KEY, LOGO_KEY, ROSTER_KEY},
            week_key::WeekKey,
        },
        utils::logging::TEST_LOGGING,
    };

    use super::{
        build_export, build_rows, export_file_name,
        spreadsheet::{JsonWorkbookWriter, XlsxWorkbookWriter},
        write_export, ExportReport, ACTIVITY_SHEET, GOALS_SHEET, SUMMARY_SHEET,
    };

    fn week(y: i32, m: u32, d: u32) -> WeekStart {
        WeekStart::new(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn save(store: &mut RecordStore<MemoryStore>, week: WeekStart, rep: &str, calls: &[u32]) {
        let mut record = WeekRecord::default();
        for (day, calls) in WorkDay::ALL.into_iter().zip(calls) {
            record.day_mut(day).set(Metric::Calls, Some(*calls));
        }
        assert!(store.save_week(week, rep, &record));
    }

    #[test]
    fn test_single_week_single_day() -> Result<()> {
        let mut store = RecordStore::new(MemoryStore::new());
        let mut record = WeekRecord::default();
        record.day_mut(WorkDay::Monday).set(Metric::Calls, Some(10));
        record.day_mut(WorkDay::Monday).set(Metric::Emails, Some(5));
        assert!(store.save_week(week(2024, 1, 1), "Ana", &record));

        let bundle = build_export(&store, &GoalConfig::default())?;

        assert_eq!(bundle.rows.len(), 5);
        let monday = &bundle.rows[0];
        assert_eq!(monday.day, WorkDay::Monday);
        assert_eq!(monday.date, date(2024, 1, 1));
        assert_eq!(
            (monday.calls, monday.emails, monday.contacts, monday.responses),
            (10, 5, 0, 0)
        );
        for (row, day) in bundle.rows.iter().zip(WorkDay::ALL).skip(1) {
            assert_eq!(row.day, day);
            assert_eq!(row.week_start, date(2024, 1, 1));
            assert_eq!((row.calls, row.emails, row.contacts, row.responses), (0, 0, 0, 0));
        }
        assert_eq!(bundle.rows[4].date, date(2024, 1, 5));

        assert_eq!(bundle.summaries.len(), 1);
        let summary = &bundle.summaries[0];
        assert_eq!(summary.rep, "Ana");
        assert_eq!(
            (
                summary.total_calls,
                summary.total_emails,
                summary.total_contacts,
                summary.total_responses,
                summary.days_tracked
            ),
            (10, 5, 0, 0, 5)
        );
        assert_eq!(bundle.report(), ExportReport { rows: 5, reps: 1 });
        Ok(())
    }

    #[test]
    fn test_nothing_to_export() -> Result<()> {
        let store = RecordStore::new(MemoryStore::new());
        assert_eq!(
            build_export(&store, &GoalConfig::default()),
            Err(ExportError::NothingToExport)
        );

        // Only singletons and unreadable weeks still count as nothing.
        let mut memory = MemoryStore::new();
        memory.set(GOALS_KEY, "{}")?;
        memory.set(ROSTER_KEY, r#"["Ana"]"#)?;
        memory.set(LOGO_KEY, "data:,")?;
        memory.set("week-2024-01-01-Ana", "][")?;
        let store = RecordStore::new(memory);
        assert_eq!(
            build_export(&store, &GoalConfig::default()),
            Err(ExportError::NothingToExport)
        );
        Ok(())
    }

    #[test]
    fn test_rows_sorted_and_summaries_consistent() -> Result<()> {
        *TEST_LOGGING;
        let mut store = RecordStore::new(MemoryStore::new());
        save(&mut store, week(2024, 2, 5), "Ana", &[1, 2, 3, 4, 5]);
        save(&mut store, week(2024, 1, 1), "A", &[7, 0, 0, 0, 1]);
        save(&mut store, week(2024, 1, 1), "A-B", &[2, 2]);
        save(&mut store, week(2023, 12, 25), "Ana", &[9]);
        store.inner_mut().set("week-2024-01-08-Bo", "oops")?;
        store.inner_mut().set("week-2024-01-09-Bo", "{}")?;

        let bundle = build_export(&store, &GoalConfig::default())?;

        assert_eq!(bundle.rows.len(), 5 * 4);
        assert!(bundle.rows.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(bundle.rows[0].date, date(2023, 12, 25));
        assert_eq!(bundle.summaries[0].rep, "Ana");

        for summary in &bundle.summaries {
            let rows = bundle
                .rows
                .iter()
                .filter(|row| row.rep == summary.rep)
                .collect::<Vec<_>>();
            assert_eq!(summary.days_tracked as usize, rows.len());
            assert_eq!(
                summary.total_calls,
                rows.iter().map(|r| u64::from(r.calls)).sum::<u64>()
            );
            assert_eq!(
                summary.total_emails,
                rows.iter().map(|r| u64::from(r.emails)).sum::<u64>()
            );
        }

        let a = bundle.summaries.iter().find(|s| s.rep == "A").unwrap();
        let a_b = bundle.summaries.iter().find(|s| s.rep == "A-B").unwrap();
        assert_eq!((a.total_calls, a.days_tracked), (8, 5));
        assert_eq!((a_b.total_calls, a_b.days_tracked), (4, 5));
        let ana = &bundle.summaries[0];
        assert_eq!((ana.total_calls, ana.days_tracked), (24, 10));
        assert_eq!(bundle.report(), ExportReport { rows: 20, reps: 3 });
        Ok(())
    }

    #[test]
    fn test_workbook_sheets_and_file() -> Result<()> {
        let mut store = RecordStore::new(MemoryStore::new());
        save(&mut store, week(2024, 1, 1), "Ana", &[3]);
        let goals = GoalConfig {
            contacts_weekly: 40,
            ..GoalConfig::default()
        };
        let bundle = build_export(&store, &goals)?;

        let workbook = bundle.workbook()?;
        let names = workbook
            .sheets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![ACTIVITY_SHEET, GOALS_SHEET, SUMMARY_SHEET]);
        assert_eq!(
            workbook.sheets[0].columns(),
            vec![
                "Sales Rep",
                "Week Starting",
                "Date",
                "Day",
                "Calls",
                "Emails",
                "Contacts",
                "Responses"
            ]
        );
        assert_eq!(workbook.sheets[0].rows[1]["Date"], "2024-01-02");
        assert_eq!(workbook.sheets[0].rows[1]["Day"], "Tuesday");
        assert_eq!(workbook.sheets[1].rows.len(), 1);
        assert_eq!(workbook.sheets[1].rows[0]["Weekly Contacts Goal"], 40);
        assert_eq!(workbook.sheets[2].rows[0]["Days Tracked"], 5);

        let dir = tempdir()?;
        let path = write_export(&bundle, &JsonWorkbookWriter, dir.path(), date(2024, 3, 9))?;
        assert_eq!(
            path.file_name().and_then(|v| v.to_str()),
            Some("Sales_Activity_Export_2024-03-09.json")
        );
        assert!(path.exists());

        let mut book = XlsxWorkbookWriter::build(&workbook)?;
        let sheets = [ACTIVITY_SHEET, GOALS_SHEET, SUMMARY_SHEET];
        for (index, name) in sheets.into_iter().enumerate() {
            assert_eq!(book.worksheet_from_index(index)?.name(), name);
        }
        assert!(book.worksheet_from_index(3).is_err());

        let path = write_export(&bundle, &XlsxWorkbookWriter, dir.path(), date(2024, 3, 9))?;
        assert_eq!(
            path.file_name().and_then(|v| v.to_str()),
            Some("Sales_Activity_Export_2024-03-09.xlsx")
        );
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_rows_on_the_same_date_keep_discovery_order() {
        let record = WeekRecord::default();
        let weeks = vec![
            (WeekKey::new(week(2024, 1, 8), "Bo"), record.clone()),
            (WeekKey::new(week(2024, 1, 1), "Zed"), record.clone()),
            (WeekKey::new(week(2024, 1, 8), "Ana"), record),
        ];

        let rows = build_rows(&weeks);

        let reps = rows.iter().map(|row| row.rep.as_str()).collect::<Vec<_>>();
        let mut expected = vec!["Zed"; 5];
        for _ in WorkDay::ALL {
            expected.extend(["Bo", "Ana"]);
        }
        assert_eq!(reps, expected);

        for pair in rows[5..].chunks(2) {
            assert_eq!(pair[0].date, pair[1].date);
            assert_eq!(pair[0].day, pair[1].day);
        }
        assert_eq!(rows[5].date, date(2024, 1, 8));
        assert_eq!(rows[14].date, date(2024, 1, 12));
    }

    #[test]
    fn test_report_message() {
        assert_eq!(export_file_name(date(2025, 1, 2), "tsv"), "Sales_Activity_Export_2025-01-02.tsv");
        assert_eq!(
            ExportReport { rows: 10, reps: 2 }.to_string(),
            "✓ Exported 10 activity records from 2 sales reps!"
        );
    }
}
