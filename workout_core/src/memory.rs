//! In-memory storage for workout logs.
//!
//! Nothing survives the process. Used for dry runs and as a second backend
//! that must honor the same contract as the filesystem one.

use crate::repository::WorkoutRepository;
use crate::types::validate_user_id;
use crate::{Error, Result, WorkoutLog};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type Key = (String, NaiveDate);

/// [`WorkoutRepository`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryWorkoutRepository {
    entries: Mutex<BTreeMap<Key, WorkoutLog>>,
}

impl InMemoryWorkoutRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<Key, WorkoutLog>>> {
        self.entries.lock().map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "workout store lock poisoned",
            ))
        })
    }
}

impl WorkoutRepository for InMemoryWorkoutRepository {
    fn save(&self, workout: &WorkoutLog) -> Result<String> {
        validate_user_id(workout.user_id())?;
        let key = (workout.user_id().to_string(), workout.workout_date());
        let id = format!("mem://{}/{}", key.0, key.1);

        self.entries()?.insert(key, workout.clone());
        tracing::debug!("Saved workout {}", id);
        Ok(id)
    }

    fn get_by_date(&self, user_id: &str, workout_date: NaiveDate) -> Result<Option<WorkoutLog>> {
        validate_user_id(user_id)?;
        let key = (user_id.to_string(), workout_date);
        Ok(self.entries()?.get(&key).cloned())
    }

    fn delete(&self, user_id: &str, workout_date: NaiveDate) -> Result<bool> {
        validate_user_id(user_id)?;
        let key = (user_id.to_string(), workout_date);
        Ok(self.entries()?.remove(&key).is_some())
    }

    fn list_dates(&self, user_id: &str) -> Result<Vec<NaiveDate>> {
        validate_user_id(user_id)?;
        // Keys sort by user then date, so the user's dates come out ascending
        Ok(self
            .entries()?
            .keys()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, date)| *date)
            .collect())
    }

    fn get_date_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<WorkoutLog>> {
        validate_user_id(user_id)?;
        if start_date > end_date {
            return Ok(Vec::new());
        }
        let start = (user_id.to_string(), start_date);
        let end = (user_id.to_string(), end_date);
        Ok(self
            .entries()?
            .range(start..=end)
            .map(|(_, workout)| workout.clone())
            .collect())
    }
}
