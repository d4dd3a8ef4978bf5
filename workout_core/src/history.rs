//! Exercise history and range summaries.
//!
//! Everything here is built on the [`WorkoutRepository`] contract, so it works
//! against any backend.

use crate::repository::WorkoutRepository;
use crate::types::achievement;
use crate::{Exercise, Result, WorkoutLog};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One occurrence of an exercise in a user's history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExerciseEntry {
    pub workout_date: NaiveDate,
    pub exercise: Exercise,
}

/// The heaviest set found in an exercise history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonalBest {
    pub workout_date: NaiveDate,
    pub weight_lbs: f64,
    pub reps: u32,
}

/// Per-exercise totals inside a [`WorkoutSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExerciseTotals {
    pub name: String,
    pub sessions: usize,
    pub sets: usize,
    pub reps: u64,
    pub total_volume: f64,
    pub goal_volume: f64,
    pub heaviest_weight_lbs: f64,
}

impl ExerciseTotals {
    pub fn volume_achievement(&self) -> f64 {
        achievement(self.total_volume, self.goal_volume)
    }
}

/// Aggregated figures for a user over a date range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub workout_count: usize,
    pub exercise_count: usize,
    pub set_count: usize,
    pub total_volume: f64,
    pub goal_volume: f64,
    pub first_workout: Option<NaiveDate>,
    pub last_workout: Option<NaiveDate>,
    /// Ordered by exercise name, case-insensitively
    pub exercises: Vec<ExerciseTotals>,
}

impl WorkoutSummary {
    pub fn volume_achievement(&self) -> f64 {
        achievement(self.total_volume, self.goal_volume)
    }
}

/// Names match ignoring case and surrounding whitespace.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Every occurrence of `exercise_name` between `start_date` and `end_date`
/// inclusive, oldest first.
pub fn exercise_history<R>(
    repo: &R,
    user_id: &str,
    exercise_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<ExerciseEntry>>
where
    R: WorkoutRepository + ?Sized,
{
    let wanted = name_key(exercise_name);
    let wanted = wanted.as_str();
    let workouts = repo.get_date_range(user_id, start_date, end_date)?;

    let entries: Vec<ExerciseEntry> = workouts
        .iter()
        .flat_map(move |workout| {
            workout
                .exercises()
                .iter()
                .filter(move |exercise| name_key(exercise.name()) == wanted)
                .map(move |exercise| ExerciseEntry {
                    workout_date: workout.workout_date(),
                    exercise: exercise.clone(),
                })
        })
        .collect();

    tracing::debug!(
        "Found {} '{}' entries for {} across {} workouts",
        entries.len(),
        exercise_name,
        user_id,
        workouts.len()
    );
    Ok(entries)
}

/// Heaviest set across the entries; ties go to more reps, then the earlier date.
pub fn personal_best(entries: &[ExerciseEntry]) -> Option<PersonalBest> {
    let mut best: Option<PersonalBest> = None;

    for entry in entries {
        for set in entry.exercise.sets() {
            let better = match &best {
                None => true,
                Some(b) => {
                    set.weight_lbs() > b.weight_lbs
                        || (set.weight_lbs() == b.weight_lbs && set.reps() > b.reps)
                }
            };
            if better {
                best = Some(PersonalBest {
                    workout_date: entry.workout_date,
                    weight_lbs: set.weight_lbs(),
                    reps: set.reps(),
                });
            }
        }
    }

    best
}

/// Aggregate the user's workouts between `start_date` and `end_date` inclusive.
pub fn summarize<R>(
    repo: &R,
    user_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<WorkoutSummary>
where
    R: WorkoutRepository + ?Sized,
{
    let workouts = repo.get_date_range(user_id, start_date, end_date)?;
    let summary = summarize_workouts(user_id, start_date, end_date, &workouts);

    tracing::info!(
        "Summarized {} workouts for {} between {} and {}",
        summary.workout_count,
        user_id,
        start_date,
        end_date
    );
    Ok(summary)
}

/// Aggregate already-loaded workouts (expected oldest first).
pub fn summarize_workouts(
    user_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    workouts: &[WorkoutLog],
) -> WorkoutSummary {
    let mut per_exercise: BTreeMap<String, ExerciseTotals> = BTreeMap::new();

    for workout in workouts {
        for exercise in workout.exercises() {
            let totals = per_exercise
                .entry(name_key(exercise.name()))
                .or_insert_with(|| ExerciseTotals {
                    name: exercise.name().trim().to_string(),
                    sessions: 0,
                    sets: 0,
                    reps: 0,
                    total_volume: 0.0,
                    goal_volume: 0.0,
                    heaviest_weight_lbs: 0.0,
                });

            totals.sessions += 1;
            totals.sets += exercise.set_count();
            totals.reps += exercise.total_reps();
            totals.total_volume += exercise.total_volume();
            totals.goal_volume += exercise.goal_volume();
            for set in exercise.sets() {
                totals.heaviest_weight_lbs = totals.heaviest_weight_lbs.max(set.weight_lbs());
            }
        }
    }

    WorkoutSummary {
        user_id: user_id.to_string(),
        start_date,
        end_date,
        workout_count: workouts.len(),
        exercise_count: workouts.iter().map(WorkoutLog::exercise_count).sum(),
        set_count: workouts
            .iter()
            .flat_map(|w| w.exercises())
            .map(Exercise::set_count)
            .sum(),
        total_volume: workouts.iter().map(WorkoutLog::total_volume).sum(),
        goal_volume: workouts.iter().map(WorkoutLog::goal_volume).sum(),
        first_workout: workouts.iter().map(WorkoutLog::workout_date).min(),
        last_workout: workouts.iter().map(WorkoutLog::workout_date).max(),
        exercises: per_exercise.into_values().collect(),
    }
}
