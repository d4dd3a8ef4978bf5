//! Error types for the workout_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value violated a data model constraint
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A stored workout exists but could not be decoded
    #[error("Corrupt workout payload at {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A date string was not in `YYYY-MM-DD` form
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Constraint violations raised while constructing workout values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("reps must be greater than zero")]
    NonPositiveReps,

    #[error("weight_lbs must be a finite, non-negative number (got {0})")]
    InvalidWeight(f64),

    #[error("goal_reps must be greater than zero")]
    InvalidGoalReps,

    #[error("goal_weight_lbs must be a finite, positive number (got {0})")]
    InvalidGoalWeight(f64),

    #[error("exercise name must not be empty")]
    EmptyName,

    #[error("exercise name is {len} characters, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("exercise '{0}' has no sets")]
    NoSets(String),

    #[error("{field} is {len} characters, maximum is {max}")]
    NotesTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("workout has no exercises")]
    NoExercises,

    #[error("workout_date {0} is outside years 1 to 9999")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("user_id must not be empty")]
    EmptyUserId,

    /// Only ASCII letters, digits, '-' and '_' are accepted, up to 64 characters
    #[error("invalid user_id '{0}': use up to 64 letters, digits, '-' or '_'")]
    InvalidUserId(String),
}
