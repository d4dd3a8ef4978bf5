use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use workout_core::*;

const NOT_FOUND: &str = "No workout found for the given user and date";

#[derive(Parser)]
#[command(name = "wlog")]
#[command(about = "Personal workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a workout from JSON, replacing any workout on the same date
    Log {
        /// JSON file to read (stdin if omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Dry run - validate and summarize without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the workout for a user on a date (YYYY-MM-DD)
    Show {
        user_id: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// List every date with a logged workout
    Dates { user_id: String },

    /// Print all workouts in an inclusive date range as JSON
    Range {
        user_id: String,
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },

    /// Delete the workout for a user on a date
    Delete {
        user_id: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Show every logged occurrence of an exercise
    History {
        user_id: String,
        exercise: String,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Aggregate volume and goal achievement over a date range
    Summary {
        user_id: String,
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },

    /// Export sets in a date range as CSV
    Export {
        user_id: String,
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    workout_core::logging::init_with_level(&config.logging.level);

    // Determine data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let repo = LocalWorkoutRepository::new(&data_dir)?;

    dispatch(&repo, cli.command)
}

fn dispatch(repo: &dyn WorkoutRepository, command: Commands) -> Result<()> {
    match command {
        Commands::Log { file, dry_run } => cmd_log(repo, file.as_deref(), dry_run),
        Commands::Show { user_id, date } => cmd_show(repo, &user_id, date),
        Commands::Dates { user_id } => cmd_dates(repo, &user_id),
        Commands::Range { user_id, from, to } => cmd_range(repo, &user_id, from, to),
        Commands::Delete { user_id, date } => cmd_delete(repo, &user_id, date),
        Commands::History {
            user_id,
            exercise,
            from,
            to,
        } => cmd_history(
            repo,
            &user_id,
            &exercise,
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        ),
        Commands::Summary { user_id, from, to } => cmd_summary(repo, &user_id, from, to),
        Commands::Export {
            user_id,
            from,
            to,
            out,
        } => cmd_export(repo, &user_id, from, to, out.as_deref()),
    }
}

fn cmd_log(repo: &dyn WorkoutRepository, file: Option<&Path>, dry_run: bool) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    // Validation happens while parsing; nothing reaches storage otherwise
    let workout: WorkoutLog = serde_json::from_str(&input)?;

    let scratch = InMemoryWorkoutRepository::new();
    let target: &dyn WorkoutRepository = if dry_run { &scratch } else { repo };
    let id = target.save(&workout)?;

    if dry_run {
        println!("[Dry run - workout is valid, not saved]");
    } else {
        println!("✓ Workout logged!");
        println!("  File: {}", id);
    }
    println!("  Date: {}", workout.workout_date());
    println!("  Exercises: {}", workout.exercise_count());
    println!("  Total volume: {:.1} lbs", workout.total_volume());
    println!(
        "  Goal achievement: {:.1}%",
        workout.volume_achievement() * 100.0
    );

    Ok(())
}

fn cmd_show(repo: &dyn WorkoutRepository, user_id: &str, date: NaiveDate) -> Result<()> {
    match repo.get_by_date(user_id, date)? {
        Some(workout) => println!("{}", serde_json::to_string_pretty(&workout)?),
        None => println!("{}", NOT_FOUND),
    }
    Ok(())
}

fn cmd_dates(repo: &dyn WorkoutRepository, user_id: &str) -> Result<()> {
    let dates = repo.list_dates(user_id)?;
    if dates.is_empty() {
        println!("No workouts found for {}", user_id);
    }
    for date in dates {
        println!("{}", date);
    }
    Ok(())
}

fn cmd_range(
    repo: &dyn WorkoutRepository,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let workouts = repo.get_date_range(user_id, from, to)?;
    println!("{}", serde_json::to_string_pretty(&workouts)?);
    Ok(())
}

fn cmd_delete(repo: &dyn WorkoutRepository, user_id: &str, date: NaiveDate) -> Result<()> {
    if repo.delete(user_id, date)? {
        println!("✓ Deleted workout for {} on {}", user_id, date);
    } else {
        println!("{}", NOT_FOUND);
    }
    Ok(())
}

fn cmd_history(
    repo: &dyn WorkoutRepository,
    user_id: &str,
    exercise: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let entries = exercise_history(repo, user_id, exercise, from, to)?;

    if entries.is_empty() {
        println!("No history for '{}'", exercise);
        return Ok(());
    }

    for entry in &entries {
        let sets: Vec<String> = entry
            .exercise
            .sets()
            .iter()
            .map(|s| format!("{}x{}", s.reps(), s.weight_lbs()))
            .collect();
        println!(
            "{}  {} ({}): {}  volume {:.1} lbs",
            entry.workout_date,
            entry.exercise.name(),
            entry.exercise.equipment(),
            sets.join(", "),
            entry.exercise.total_volume()
        );
    }

    if let Some(best) = personal_best(&entries) {
        println!();
        println!(
            "  Best set: {}x{} lbs on {}",
            best.reps, best.weight_lbs, best.workout_date
        );
    }

    Ok(())
}

fn cmd_summary(
    repo: &dyn WorkoutRepository,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let summary = summarize(repo, user_id, from, to)?;

    println!("Summary for {} ({} to {})", user_id, from, to);
    println!("  Workouts: {}", summary.workout_count);
    println!("  Exercises: {}", summary.exercise_count);
    println!("  Sets: {}", summary.set_count);
    println!("  Total volume: {:.1} lbs", summary.total_volume);
    println!("  Goal volume: {:.1} lbs", summary.goal_volume);
    println!(
        "  Goal achievement: {:.1}%",
        summary.volume_achievement() * 100.0
    );

    if !summary.exercises.is_empty() {
        println!();
        for totals in &summary.exercises {
            println!(
                "  {}: {} sessions, {} sets, {} reps, {:.1} lbs (best {} lbs, {:.1}%)",
                totals.name,
                totals.sessions,
                totals.sets,
                totals.reps,
                totals.total_volume,
                totals.heaviest_weight_lbs,
                totals.volume_achievement() * 100.0
            );
        }
    }

    Ok(())
}

fn cmd_export(
    repo: &dyn WorkoutRepository,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    out: Option<&Path>,
) -> Result<()> {
    let workouts = repo.get_date_range(user_id, from, to)?;

    match out {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            let rows = export_sets_csv(&workouts, writer)?;
            println!("✓ Exported {} sets to {}", rows, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export_sets_csv(&workouts, &mut handle)?;
            handle.flush()?;
        }
    }

    Ok(())
}
