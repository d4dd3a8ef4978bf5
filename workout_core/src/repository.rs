//! Storage contract for workout logs.
//!
//! Callers only talk to [`WorkoutRepository`]; the backend (local files,
//! memory, or anything else) is picked once at startup and passed in.

use crate::{Result, WorkoutLog};
use chrono::NaiveDate;

/// Durable storage of workout logs keyed by `(user_id, workout_date)`.
///
/// Implementations must reject unsafe user ids with a validation error
/// before touching storage, and must report "nothing stored" as `None`,
/// `false` or an empty list rather than as an error.
pub trait WorkoutRepository: Send + Sync {
    /// Persist a workout, replacing any existing entry for the same user and
    /// date. Returns an opaque identifier suitable for logging.
    fn save(&self, workout: &WorkoutLog) -> Result<String>;

    /// Fetch the workout for a user on a date, if one exists.
    fn get_by_date(&self, user_id: &str, workout_date: NaiveDate) -> Result<Option<WorkoutLog>>;

    /// Remove the workout for a user on a date.
    ///
    /// Returns `true` if an entry was removed, `false` if there was none.
    fn delete(&self, user_id: &str, workout_date: NaiveDate) -> Result<bool>;

    /// All dates with a saved workout for the user, oldest first.
    fn list_dates(&self, user_id: &str) -> Result<Vec<NaiveDate>>;

    /// Workouts between `start_date` and `end_date` inclusive, oldest first.
    ///
    /// Walks `list_dates` and loads each match, which is fine for daily logs.
    /// A backend holding long histories should override this with an indexed
    /// lookup.
    fn get_date_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<WorkoutLog>> {
        let mut workouts = Vec::new();

        for workout_date in self.list_dates(user_id)? {
            if workout_date < start_date || workout_date > end_date {
                continue;
            }
            if let Some(workout) = self.get_by_date(user_id, workout_date)? {
                workouts.push(workout);
            }
        }

        workouts.sort_by_key(|w| w.workout_date());
        tracing::debug!(
            "Loaded {} workouts for {} between {} and {}",
            workouts.len(),
            user_id,
            start_date,
            end_date
        );
        Ok(workouts)
    }
}
