use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, trace, warn};

use crate::error::{KeyDecodeError, StoreError};

use super::{
    entities::{GoalConfig, Roster, WeekRecord, WeekStart},
    kv_store::KeyValueStore,
    week_key::{self, WeekKey},
};

pub const GOALS_KEY: &str = "tracker-goals";
pub const ROSTER_KEY: &str = "tracker-reps";
pub const LOGO_KEY: &str = "tracker-logo";

/// Typed access to everything the tracker keeps in a [KeyValueStore].
///
/// Nothing here returns an error. Reads fall back to defaults and writes report `false`, with the
/// cause written to the log.
pub struct RecordStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Record for `rep` in `week_start`. Empty if nothing was saved yet or the saved blob can't be
    /// read.
    pub fn load_week(&self, week_start: WeekStart, rep: &str) -> WeekRecord {
        let key = week_key::encode(week_start, rep);
        self.load_or_default(&key)
    }

    /// Overwrites the stored record for that week.
    #[must_use]
    pub fn save_week(&mut self, week_start: WeekStart, rep: &str, record: &WeekRecord) -> bool {
        let key = week_key::encode(week_start, rep);
        self.save_json(&key, record)
    }

    pub fn load_goals(&self) -> GoalConfig {
        self.load_or_default(GOALS_KEY)
    }

    #[must_use]
    pub fn save_goals(&mut self, goals: &GoalConfig) -> bool {
        self.save_json(GOALS_KEY, goals)
    }

    pub fn load_roster(&self) -> Roster {
        self.load_or_default(ROSTER_KEY)
    }

    #[must_use]
    pub fn save_roster(&mut self, roster: &Roster) -> bool {
        self.save_json(ROSTER_KEY, roster)
    }

    /// The logo is kept as the raw data url, not as JSON.
    pub fn load_logo(&self) -> Option<String> {
        match self.store.get(LOGO_KEY) {
            Ok(v) => v.filter(|v| !v.is_empty()),
            Err(e) => {
                error!("Failed to read logo {e}");
                None
            }
        }
    }

    #[must_use]
    pub fn save_logo(&mut self, data_url: &str) -> bool {
        match self.store.set(LOGO_KEY, data_url) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save logo {e}");
                false
            }
        }
    }

    /// Every week record in the store, in the order the store lists them. Keys that aren't week
    /// keys are ignored, broken keys and records are logged and left out.
    pub fn stored_weeks(&self) -> Vec<(WeekKey, WeekRecord)> {
        let keys = match self.store.list_keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to list stored keys {e}");
                return vec![];
            }
        };

        let mut weeks = Vec::new();
        for key in keys {
            let week_key = match WeekKey::decode(&key) {
                Ok(v) => v,
                Err(KeyDecodeError::NotAWeekKey) => {
                    trace!("Skipping {key:?}");
                    continue;
                }
                Err(e) => {
                    warn!("Skipping stored week: {e}");
                    continue;
                }
            };

            match self.read_json::<WeekRecord>(&key) {
                Ok(Some(record)) => weeks.push((week_key, record)),
                Ok(None) => debug!("Key {key:?} disappeared during enumeration"),
                Err(e) => warn!("Skipping stored week {key:?}: {e:?}"),
            }
        }
        weeks
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Found illegal json string under {key:?}: {raw}"))?;
        Ok(Some(value))
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_json(key) {
            Ok(Some(v)) => v,
            Ok(None) => {
                debug!("Nothing stored under {key:?}, using defaults");
                T::default()
            }
            Err(e) => {
                warn!("Failed to load {key:?}, using defaults: {e:?}");
                T::default()
            }
        }
    }

    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|serialized| self.store.set(key, &serialized));
        match result {
            Ok(()) => {
                debug!("Saved {key:?}");
                true
            }
            Err(e) => {
                error!("Failed to save {key:?}: {e}");
                false
            }
        }
    }
}
