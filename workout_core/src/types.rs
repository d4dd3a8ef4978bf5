//! Core domain types for workout logging.
//!
//! This module defines the value types stored by the repository:
//! - Equipment kinds
//! - Sets with optional planned targets
//! - Exercises (one movement, one or more sets)
//! - Workout logs (one user's session on one calendar date)
//!
//! Every type is validated at construction and immutable afterwards.
//! Deserialization runs through the same constructors, so a stored payload
//! that breaks an invariant is rejected instead of producing a value.

use crate::error::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_EXERCISE_NAME_LEN: usize = 100;
pub const MAX_EXERCISE_NOTES_LEN: usize = 500;
pub const MAX_WORKOUT_NOTES_LEN: usize = 1000;
pub const MAX_USER_ID_LEN: usize = 64;

/// Storage paths hold the year as exactly four digits.
pub const MIN_WORKOUT_YEAR: i32 = 1;
pub const MAX_WORKOUT_YEAR: i32 = 9999;

/// Ratio of actual to planned volume; a missing goal counts as fully met.
pub(crate) fn achievement(total: f64, goal: f64) -> f64 {
    if goal == 0.0 {
        1.0
    } else {
        total / goal
    }
}

fn check_notes(
    field: &'static str,
    notes: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    if let Some(notes) = notes {
        let len = notes.chars().count();
        if len > max {
            return Err(ValidationError::NotesTooLong { field, len, max });
        }
    }
    Ok(())
}

/// Check that a user id is safe to use as a single storage path segment.
pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.is_empty() {
        return Err(ValidationError::EmptyUserId);
    }
    let allowed = user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !allowed || user_id.len() > MAX_USER_ID_LEN {
        return Err(ValidationError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| crate::Error::InvalidDate(s.to_string()))
}

// ============================================================================
// Equipment
// ============================================================================

/// Equipment used for an exercise.
///
/// Determines how `weight_lbs` is read: per hand for dumbbells and
/// kettlebells, total for barbells, zero for bodyweight work.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Bodyweight,
    Cable,
    Band,
}

impl Equipment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Machine => "machine",
            Equipment::Bodyweight => "bodyweight",
            Equipment::Cable => "cable",
            Equipment::Band => "band",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Set
// ============================================================================

/// One performed set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SetFields")]
pub struct Set {
    reps: u32,
    weight_lbs: f64,
    goal_reps: Option<u32>,
    goal_weight_lbs: Option<f64>,
}

#[derive(Deserialize)]
struct SetFields {
    reps: u32,
    weight_lbs: f64,
    #[serde(default)]
    goal_reps: Option<u32>,
    #[serde(default)]
    goal_weight_lbs: Option<f64>,
}

impl TryFrom<SetFields> for Set {
    type Error = ValidationError;

    fn try_from(fields: SetFields) -> Result<Self, Self::Error> {
        Set::with_goal(
            fields.reps,
            fields.weight_lbs,
            fields.goal_reps,
            fields.goal_weight_lbs,
        )
    }
}

impl Set {
    /// A set with no planned target.
    pub fn new(reps: u32, weight_lbs: f64) -> Result<Self, ValidationError> {
        Self::with_goal(reps, weight_lbs, None, None)
    }

    /// A set with optional planned reps and weight.
    pub fn with_goal(
        reps: u32,
        weight_lbs: f64,
        goal_reps: Option<u32>,
        goal_weight_lbs: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if reps == 0 {
            return Err(ValidationError::NonPositiveReps);
        }
        if !weight_lbs.is_finite() || weight_lbs < 0.0 {
            return Err(ValidationError::InvalidWeight(weight_lbs));
        }
        if goal_reps == Some(0) {
            return Err(ValidationError::InvalidGoalReps);
        }
        if let Some(goal) = goal_weight_lbs {
            if !goal.is_finite() || goal <= 0.0 {
                return Err(ValidationError::InvalidGoalWeight(goal));
            }
        }

        Ok(Self {
            reps,
            weight_lbs,
            goal_reps,
            goal_weight_lbs,
        })
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn weight_lbs(&self) -> f64 {
        self.weight_lbs
    }

    pub fn goal_reps(&self) -> Option<u32> {
        self.goal_reps
    }

    pub fn goal_weight_lbs(&self) -> Option<f64> {
        self.goal_weight_lbs
    }

    /// Reps times weight
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight_lbs
    }

    /// Planned volume; a missing goal field falls back to what was performed.
    pub fn goal_volume(&self) -> f64 {
        let reps = self.goal_reps.unwrap_or(self.reps);
        let weight = self.goal_weight_lbs.unwrap_or(self.weight_lbs);
        f64::from(reps) * weight
    }
}

// ============================================================================
// Exercise
// ============================================================================

/// One movement performed for one or more sets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ExerciseFields")]
pub struct Exercise {
    name: String,
    equipment: Equipment,
    sets: Vec<Set>,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct ExerciseFields {
    name: String,
    equipment: Equipment,
    sets: Vec<Set>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<ExerciseFields> for Exercise {
    type Error = ValidationError;

    fn try_from(fields: ExerciseFields) -> Result<Self, Self::Error> {
        Exercise::build(fields.name, fields.equipment, fields.sets, fields.notes)
    }
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        equipment: Equipment,
        sets: Vec<Set>,
    ) -> Result<Self, ValidationError> {
        Self::build(name.into(), equipment, sets, None)
    }

    /// Attach free-form notes (at most 500 characters).
    pub fn with_notes(self, notes: impl Into<String>) -> Result<Self, ValidationError> {
        Self::build(self.name, self.equipment, self.sets, Some(notes.into()))
    }

    fn build(
        name: String,
        equipment: Equipment,
        sets: Vec<Set>,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_EXERCISE_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                len,
                max: MAX_EXERCISE_NAME_LEN,
            });
        }
        if sets.is_empty() {
            return Err(ValidationError::NoSets(name));
        }
        check_notes("exercise notes", notes.as_deref(), MAX_EXERCISE_NOTES_LEN)?;

        Ok(Self {
            name,
            equipment,
            sets,
            notes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn total_volume(&self) -> f64 {
        self.sets.iter().map(Set::volume).sum()
    }

    pub fn goal_volume(&self) -> f64 {
        self.sets.iter().map(Set::goal_volume).sum()
    }

    pub fn volume_achievement(&self) -> f64 {
        achievement(self.total_volume(), self.goal_volume())
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Total reps across all sets (the useful load figure for bodyweight work)
    pub fn total_reps(&self) -> u64 {
        self.sets.iter().map(|s| u64::from(s.reps)).sum()
    }
}

// ============================================================================
// Workout Log
// ============================================================================

/// One user's workout session on one calendar date.
///
/// `(user_id, workout_date)` is the storage key: saving a second log for the
/// same key replaces the first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "WorkoutLogFields")]
pub struct WorkoutLog {
    workout_date: NaiveDate,
    user_id: String,
    exercises: Vec<Exercise>,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct WorkoutLogFields {
    workout_date: NaiveDate,
    user_id: String,
    exercises: Vec<Exercise>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<WorkoutLogFields> for WorkoutLog {
    type Error = ValidationError;

    fn try_from(fields: WorkoutLogFields) -> Result<Self, Self::Error> {
        WorkoutLog::build(
            fields.user_id,
            fields.workout_date,
            fields.exercises,
            fields.notes,
        )
    }
}

impl WorkoutLog {
    pub fn new(
        user_id: impl Into<String>,
        workout_date: NaiveDate,
        exercises: Vec<Exercise>,
    ) -> Result<Self, ValidationError> {
        Self::build(user_id.into(), workout_date, exercises, None)
    }

    /// Attach session notes (at most 1000 characters).
    pub fn with_notes(self, notes: impl Into<String>) -> Result<Self, ValidationError> {
        Self::build(
            self.user_id,
            self.workout_date,
            self.exercises,
            Some(notes.into()),
        )
    }

    fn build(
        user_id: String,
        workout_date: NaiveDate,
        exercises: Vec<Exercise>,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_user_id(&user_id)?;
        if !(MIN_WORKOUT_YEAR..=MAX_WORKOUT_YEAR).contains(&workout_date.year()) {
            return Err(ValidationError::DateOutOfRange(workout_date));
        }
        if exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }
        check_notes("workout notes", notes.as_deref(), MAX_WORKOUT_NOTES_LEN)?;

        Ok(Self {
            workout_date,
            user_id,
            exercises,
            notes,
        })
    }

    pub fn workout_date(&self) -> NaiveDate {
        self.workout_date
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::total_volume).sum()
    }

    pub fn goal_volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::goal_volume).sum()
    }

    pub fn volume_achievement(&self) -> f64 {
        achievement(self.total_volume(), self.goal_volume())
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }
}
