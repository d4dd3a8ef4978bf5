#![forbid(unsafe_code)]

//! Core domain model and storage for the workout log.
//!
//! This crate provides:
//! - Domain types (sets, exercises, workout logs, derived volume metrics)
//! - The repository contract and its filesystem and in-memory backends
//! - Exercise history, summaries and CSV export
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod repository;
pub mod local;
pub mod memory;
pub mod history;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use types::*;
pub use repository::WorkoutRepository;
pub use local::LocalWorkoutRepository;
pub use memory::InMemoryWorkoutRepository;
pub use history::{exercise_history, personal_best, summarize, ExerciseEntry, WorkoutSummary};
pub use export::export_sets_csv;
pub use config::Config;
