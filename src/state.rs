//! Everything the front end works with between saves. All persistence goes through the
//! [RecordStore] handed into each operation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::{
    error::{InputError, RosterError, WeekStartError},
    progress::{day_progress, week_progress, Progress},
    storage::{
        entities::{GoalConfig, Metric, Roster, WeekRecord, WeekStart, WorkDay},
        kv_store::KeyValueStore,
        record_store::RecordStore,
    },
    utils::clock::Clock,
};

const SAVE_MESSAGE_TTL: Duration = Duration::seconds(3);
const SETTINGS_MESSAGE_TTL: Duration = Duration::seconds(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
}

/// Short lived message shown after an action. It's never blocking, it just stops being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl StatusMessage {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.shown_at >= self.ttl
    }
}

/// Parses a number typed into a metric field. An empty field means "not entered".
pub fn parse_count(input: &str) -> Result<Option<u32>, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u32>()
        .map(Some)
        .map_err(|_| InputError::NotACount(input.to_string()))
}

pub struct TrackerState {
    pub selected_rep: Option<String>,
    pub week_start: WeekStart,
    pub week_data: WeekRecord,
    pub goals: GoalConfig,
    pub roster: Roster,
    pub logo: Option<String>,
    pub status: Option<StatusMessage>,
    clock: Box<dyn Clock>,
}

impl TrackerState {
    /// Restores goals, roster and logo and selects the current week.
    pub fn load<S: KeyValueStore>(
        store: &RecordStore<S>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, WeekStartError> {
        let week_start = WeekStart::containing(clock.today())?;
        Ok(Self {
            selected_rep: None,
            week_start,
            week_data: WeekRecord::default(),
            goals: store.load_goals(),
            roster: store.load_roster(),
            logo: store.load_logo(),
            status: None,
            clock,
        })
    }

    pub fn select_rep<S: KeyValueStore>(&mut self, store: &RecordStore<S>, rep: Option<&str>) {
        self.selected_rep = rep.map(str::to_string);
        self.reload_week(store);
    }

    /// Any date of the week can be given, it is moved back to that week's Monday.
    pub fn select_week<S: KeyValueStore>(
        &mut self,
        store: &RecordStore<S>,
        date: NaiveDate,
    ) -> Result<(), WeekStartError> {
        self.week_start = WeekStart::containing(date)?;
        self.reload_week(store);
        Ok(())
    }

    fn reload_week<S: KeyValueStore>(&mut self, store: &RecordStore<S>) {
        self.week_data = match &self.selected_rep {
            Some(rep) => store.load_week(self.week_start, rep),
            None => WeekRecord::default(),
        };
    }

    /// Changes a single field in memory. Nothing is written until [Self::save_week].
    pub fn update_day_data(
        &mut self,
        day: WorkDay,
        metric: Metric,
        input: &str,
    ) -> Result<(), InputError> {
        let value = parse_count(input)?;
        self.week_data.day_mut(day).set(metric, value);
        Ok(())
    }

    /// Saves the whole week for the selected representative. Without a selection there is
    /// nothing to save.
    pub fn save_week<S: KeyValueStore>(&mut self, store: &mut RecordStore<S>) -> bool {
        let Some(rep) = self.selected_rep.as_deref() else {
            debug!("No representative selected, skipping save");
            return false;
        };
        let saved = store.save_week(self.week_start, rep, &self.week_data);
        if saved {
            self.show("✓ Data saved successfully!", StatusKind::Success, SAVE_MESSAGE_TTL);
        } else {
            self.show("❌ Error saving data!", StatusKind::Failure, SAVE_MESSAGE_TTL);
        }
        saved
    }

    pub fn save_goals<S: KeyValueStore>(&mut self, store: &mut RecordStore<S>) -> bool {
        let saved = store.save_goals(&self.goals);
        if saved {
            self.show("✓ Goals updated!", StatusKind::Success, SETTINGS_MESSAGE_TTL);
        }
        saved
    }

    pub fn add_rep<S: KeyValueStore>(
        &mut self,
        store: &mut RecordStore<S>,
        name: &str,
    ) -> Result<bool, RosterError> {
        let name = self.roster.add(name)?;
        info!("Added representative {name:?}");
        let saved = store.save_roster(&self.roster);
        if saved {
            self.show("✓ Rep added!", StatusKind::Success, SETTINGS_MESSAGE_TTL);
        }
        Ok(saved)
    }

    /// Drops `name` from the roster. Weeks already saved for them stay in the store and keep
    /// showing up in exports.
    pub fn remove_rep<S: KeyValueStore>(&mut self, store: &mut RecordStore<S>, name: &str) -> bool {
        if !self.roster.remove(name) {
            return false;
        }
        info!("Removed representative {name:?}");
        if self.selected_rep.as_deref() == Some(name) {
            self.select_rep(store, None);
        }
        store.save_roster(&self.roster)
    }

    pub fn set_logo<S: KeyValueStore>(&mut self, store: &mut RecordStore<S>, data_url: String) -> bool {
        let saved = store.save_logo(&data_url);
        if saved {
            self.logo = Some(data_url);
            self.show("✓ Logo updated!", StatusKind::Success, SETTINGS_MESSAGE_TTL);
        }
        saved
    }

    pub fn week_progress(&self) -> [Progress; 4] {
        week_progress(&self.week_data, &self.goals)
    }

    pub fn day_progress(&self, day: WorkDay) -> [Progress; 4] {
        day_progress(self.week_data.day(day), &self.goals)
    }

    /// Current status, if it hasn't run out yet.
    pub fn visible_status(&self) -> Option<&StatusMessage> {
        let now = self.clock.time();
        self.status.as_ref().filter(|status| !status.is_expired(now))
    }

    fn show(&mut self, text: &str, kind: StatusKind, ttl: Duration) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            kind,
            shown_at: self.clock.time(),
            ttl,
        });
    }
}
