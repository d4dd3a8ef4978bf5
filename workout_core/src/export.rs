//! Flat CSV export of logged sets.
//!
//! One row per set, so the output drops straight into a spreadsheet.

use crate::{Result, WorkoutLog};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_date: String,
    user_id: &'a str,
    exercise: &'a str,
    equipment: &'static str,
    set_number: usize,
    reps: u32,
    weight_lbs: f64,
    goal_reps: Option<u32>,
    goal_weight_lbs: Option<f64>,
    volume: f64,
}

/// Write every set of `workouts` as CSV to `writer`.
///
/// The header row is always written, even with no workouts.
/// Returns the number of data rows.
pub fn export_sets_csv<W: Write>(workouts: &[WorkoutLog], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record([
        "workout_date",
        "user_id",
        "exercise",
        "equipment",
        "set_number",
        "reps",
        "weight_lbs",
        "goal_reps",
        "goal_weight_lbs",
        "volume",
    ])?;

    let mut rows = 0;
    for workout in workouts {
        let workout_date = workout.workout_date().format("%Y-%m-%d").to_string();
        for exercise in workout.exercises() {
            for (index, set) in exercise.sets().iter().enumerate() {
                writer.serialize(CsvRow {
                    workout_date: workout_date.clone(),
                    user_id: workout.user_id(),
                    exercise: exercise.name(),
                    equipment: exercise.equipment().as_str(),
                    set_number: index + 1,
                    reps: set.reps(),
                    weight_lbs: set.weight_lbs(),
                    goal_reps: set.goal_reps(),
                    goal_weight_lbs: set.goal_weight_lbs(),
                    volume: set.volume(),
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} sets from {} workouts", rows, workouts.len());
    Ok(rows)
}
