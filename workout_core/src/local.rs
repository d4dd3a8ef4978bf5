//! Local filesystem storage for workout logs.
//!
//! Each workout is one pretty-printed JSON file, partitioned by user, year
//! and month:
//!
//! ```text
//! base_dir/
//! └── workouts/
//!     └── {user_id}/
//!         └── {YYYY}/
//!             └── {MM}/
//!                 └── {DD}.json
//! ```
//!
//! Example: `local_storage/workouts/nettle/2024/12/05.json`
//!
//! Each user directory also holds a `.lock` file that writers share.

use crate::repository::WorkoutRepository;
use crate::types::validate_user_id;
use crate::{Error, Result, WorkoutLog};
use chrono::{Datelike, NaiveDate};
use fs2::FileExt;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const WORKOUTS_DIR: &str = "workouts";
const ENTRY_EXTENSION: &str = "json";
const LOCK_FILE: &str = ".lock";

/// Filesystem-backed [`WorkoutRepository`].
///
/// Holds nothing but its root path, so one instance can be shared by every
/// request handler.
#[derive(Clone, Debug)]
pub struct LocalWorkoutRepository {
    base_dir: PathBuf,
    workouts_dir: PathBuf,
}

impl LocalWorkoutRepository {
    /// Open (and create if needed) a repository rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let workouts_dir = base_dir.join(WORKOUTS_DIR);
        fs::create_dir_all(&workouts_dir)?;
        tracing::debug!("Opened workout repository at {:?}", workouts_dir);

        Ok(Self {
            base_dir,
            workouts_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn workouts_dir(&self) -> &Path {
        &self.workouts_dir
    }

    /// Path of the entry for a user and date. Callers validate `user_id` first.
    fn workout_path(&self, user_id: &str, workout_date: NaiveDate) -> PathBuf {
        self.workouts_dir
            .join(user_id)
            .join(format!("{:04}", workout_date.year()))
            .join(format!("{:02}", workout_date.month()))
            .join(format!("{:02}.{}", workout_date.day(), ENTRY_EXTENSION))
    }

    /// Take the per-user writer lock. Saves and deletes for one user run one at
    /// a time; readers never lock and rely on the atomic rename instead.
    fn lock_user(&self, user_id: &str) -> Result<File> {
        let user_dir = self.workouts_dir.join(user_id);
        fs::create_dir_all(&user_dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(user_dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }
}

/// Parse a directory or file name made only of ASCII digits.
fn numeric_name(name: &OsStr) -> Option<u32> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Subdirectories of `dir` whose names are numeric, with the parsed number.
fn numeric_subdirs(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match numeric_name(&entry.file_name()) {
            Some(n) => found.push((n, entry.path())),
            None => tracing::warn!("Skipping unexpected directory {:?}", entry.path()),
        }
    }
    Ok(found)
}

impl WorkoutRepository for LocalWorkoutRepository {
    fn save(&self, workout: &WorkoutLog) -> Result<String> {
        validate_user_id(workout.user_id())?;
        let path = self.workout_path(workout.user_id(), workout.workout_date());

        let parent = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "workout path missing parent")
        })?;
        fs::create_dir_all(parent)?;

        let contents = serde_json::to_string_pretty(workout)?;

        let lock = self.lock_user(workout.user_id())?;

        // Unique temp file in the same directory so the rename is atomic
        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        lock.unlock()?;

        tracing::info!(
            "Saved workout for {} on {} to {:?}",
            workout.user_id(),
            workout.workout_date(),
            path
        );
        Ok(path.display().to_string())
    }

    fn get_by_date(&self, user_id: &str, workout_date: NaiveDate) -> Result<Option<WorkoutLog>> {
        validate_user_id(user_id)?;
        let path = self.workout_path(user_id, workout_date);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No workout at {:?}", path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let workout: WorkoutLog = serde_json::from_str(&contents).map_err(|source| {
            Error::Corrupt {
                path: path.clone(),
                source,
            }
        })?;

        // A file copied into the wrong slot must not be served under this key
        if workout.user_id() != user_id || workout.workout_date() != workout_date {
            return Err(Error::Corrupt {
                path,
                source: <serde_json::Error as serde::de::Error>::custom(format!(
                    "entry belongs to {} on {}",
                    workout.user_id(),
                    workout.workout_date()
                )),
            });
        }

        tracing::debug!("Loaded workout from {:?}", path);
        Ok(Some(workout))
    }

    fn delete(&self, user_id: &str, workout_date: NaiveDate) -> Result<bool> {
        validate_user_id(user_id)?;
        let path = self.workout_path(user_id, workout_date);

        if !self.workouts_dir.join(user_id).is_dir() {
            return Ok(false);
        }
        let lock = self.lock_user(user_id)?;

        let removed = match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Deleted workout {:?}", path);
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        lock.unlock()?;
        Ok(removed)
    }

    fn list_dates(&self, user_id: &str) -> Result<Vec<NaiveDate>> {
        validate_user_id(user_id)?;
        let user_dir = self.workouts_dir.join(user_id);

        if !user_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();

        for (year, year_dir) in numeric_subdirs(&user_dir)? {
            let Ok(year) = i32::try_from(year) else {
                tracing::warn!("Skipping out-of-range year directory {:?}", year_dir);
                continue;
            };

            for (month, month_dir) in numeric_subdirs(&year_dir)? {
                for entry in fs::read_dir(&month_dir)? {
                    let entry = entry?;
                    let path = entry.path();

                    // Skips in-flight temp files as well as stray files
                    if !entry.file_type()?.is_file()
                        || path.extension() != Some(OsStr::new(ENTRY_EXTENSION))
                    {
                        tracing::debug!("Ignoring {:?}", path);
                        continue;
                    }

                    let day = path.file_stem().and_then(numeric_name);
                    let Some(date) = day.and_then(|d| NaiveDate::from_ymd_opt(year, month, d))
                    else {
                        tracing::warn!("Skipping entry with invalid date {:?}", path);
                        continue;
                    };

                    // Unpadded names like 2024/1/7.json are not where get_by_date looks
                    if self.workout_path(user_id, date) != path {
                        tracing::warn!("Skipping non-canonical entry {:?}", path);
                        continue;
                    }
                    dates.push(date);
                }
            }
        }

        dates.sort();
        tracing::debug!("Found {} workout dates for {}", dates.len(), user_id);
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::contract::{self, date, workout};

    fn temp_repo() -> (tempfile::TempDir, LocalWorkoutRepository) {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = LocalWorkoutRepository::new(temp_dir.path().join("local_storage")).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_repository_initialization() {
        let (_dir, repo) = temp_repo();
        assert_eq!(repo.base_dir().file_name().unwrap(), "local_storage");
        assert!(repo.workouts_dir().is_dir());
    }

    #[test]
    fn test_save_and_get() {
        let (_dir, repo) = temp_repo();
        contract::save_and_get(&repo);
    }

    #[test]
    fn test_missing_entry_is_none() {
        let (_dir, repo) = temp_repo();
        contract::missing_entry_is_none(&repo);
    }

    #[test]
    fn test_save_overwrites() {
        let (_dir, repo) = temp_repo();
        contract::save_overwrites(&repo);
    }

    #[test]
    fn test_delete_existing() {
        let (_dir, repo) = temp_repo();
        contract::delete_existing(&repo);
    }

    #[test]
    fn test_delete_missing() {
        let (_dir, repo) = temp_repo();
        contract::delete_missing(&repo);
    }

    #[test]
    fn test_list_dates_unknown_user() {
        let (_dir, repo) = temp_repo();
        contract::list_dates_unknown_user(&repo);
    }

    #[test]
    fn test_list_dates_sorted_per_user() {
        let (_dir, repo) = temp_repo();
        contract::list_dates_sorted_per_user(&repo);
    }

    #[test]
    fn test_date_range() {
        let (_dir, repo) = temp_repo();
        contract::date_range(&repo);
    }

    #[test]
    fn test_rejects_unsafe_user_ids() {
        let (dir, repo) = temp_repo();
        contract::rejects_unsafe_user_ids(&repo);

        // Nothing was created outside the workouts directory
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsStr::new("local_storage").to_os_string()]);
    }

    #[test]
    fn test_layout_on_disk() {
        let (_dir, repo) = temp_repo();
        let id = repo
            .save(&workout("nettle", date(2024, 3, 5), "Squat", 185.0))
            .unwrap();

        let expected = repo
            .workouts_dir()
            .join("nettle")
            .join("2024")
            .join("03")
            .join("05.json");
        assert!(expected.is_file());
        assert_eq!(id, expected.display().to_string());

        // Pretty-printed with the declared field names
        let contents = fs::read_to_string(&expected).unwrap();
        assert!(contents.contains("\n  \"workout_date\": \"2024-03-05\""));
        assert!(contents.contains("\"equipment\": \"barbell\""));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (_dir, repo) = temp_repo();
        repo.save(&workout("nettle", date(2024, 3, 5), "Squat", 185.0))
            .unwrap();
        repo.save(&workout("nettle", date(2024, 3, 5), "Squat", 195.0))
            .unwrap();

        let month_dir = repo.workouts_dir().join("nettle/2024/03");
        let names: Vec<_> = fs::read_dir(&month_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsStr::new("05.json").to_os_string()]);
    }

    #[test]
    fn test_corrupt_entry_is_an_error_not_missing() {
        let (_dir, repo) = temp_repo();
        let month_dir = repo.workouts_dir().join("nettle/2024/03");
        fs::create_dir_all(&month_dir).unwrap();
        fs::write(month_dir.join("05.json"), "{ invalid json }").unwrap();

        let result = repo.get_by_date("nettle", date(2024, 3, 5));
        assert!(matches!(result, Err(Error::Corrupt { .. })));

        // Still listed: the entry exists, it is just damaged
        assert_eq!(repo.list_dates("nettle").unwrap(), vec![date(2024, 3, 5)]);
        assert!(repo
            .get_date_range("nettle", date(2024, 3, 1), date(2024, 3, 31))
            .is_err());
    }

    #[test]
    fn test_payload_breaking_invariants_is_corrupt() {
        let (_dir, repo) = temp_repo();
        let month_dir = repo.workouts_dir().join("nettle/2024/03");
        fs::create_dir_all(&month_dir).unwrap();
        let zero_reps = r#"{
            "workout_date": "2024-03-05",
            "user_id": "nettle",
            "exercises": [
                {"name": "Squat", "equipment": "barbell", "sets": [{"reps": 0, "weight_lbs": 185}]}
            ],
            "notes": null
        }"#;
        fs::write(month_dir.join("05.json"), zero_reps).unwrap();

        assert!(matches!(
            repo.get_by_date("nettle", date(2024, 3, 5)),
            Err(Error::Corrupt { .. })
        ));
    }

    #[test]
    fn test_misplaced_entry_is_corrupt() {
        let (_dir, repo) = temp_repo();
        repo.save(&workout("nettle", date(2024, 3, 5), "Squat", 185.0))
            .unwrap();

        let src = repo.workouts_dir().join("nettle/2024/03/05.json");
        fs::copy(&src, repo.workouts_dir().join("nettle/2024/03/06.json")).unwrap();

        assert!(matches!(
            repo.get_by_date("nettle", date(2024, 3, 6)),
            Err(Error::Corrupt { .. })
        ));
    }

    #[test]
    fn test_list_dates_skips_foreign_entries() {
        let (_dir, repo) = temp_repo();
        repo.save(&workout("nettle", date(2024, 2, 28), "Squat", 185.0))
            .unwrap();

        let user_dir = repo.workouts_dir().join("nettle");
        fs::write(user_dir.join("README.txt"), "not a year").unwrap();
        fs::create_dir_all(user_dir.join("archive")).unwrap();
        fs::write(user_dir.join("2024/02/notes.txt"), "stray").unwrap();
        fs::write(user_dir.join("2024/02/30.json"), "{}").unwrap();
        fs::write(user_dir.join("2024/02/x1.json"), "{}").unwrap();
        fs::write(user_dir.join("2024/02/.tmpAbC123"), "partial").unwrap();

        // Unpadded or over-padded names would never be found by get_by_date
        let saved = user_dir.join("2024/02/28.json");
        fs::copy(&saved, user_dir.join("2024/02/7.json")).unwrap();
        fs::create_dir_all(user_dir.join("2024/1")).unwrap();
        fs::copy(&saved, user_dir.join("2024/1/09.json")).unwrap();
        fs::create_dir_all(user_dir.join("02024/02")).unwrap();
        fs::copy(&saved, user_dir.join("02024/02/10.json")).unwrap();

        assert_eq!(repo.list_dates("nettle").unwrap(), vec![date(2024, 2, 28)]);
        let range = repo
            .get_date_range("nettle", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_listed_dates_are_all_loadable() {
        let (_dir, repo) = temp_repo();
        for d in [date(1, 1, 1), date(2024, 1, 9), date(9999, 12, 31)] {
            repo.save(&workout("nettle", d, "Squat", 185.0)).unwrap();
        }

        let dates = repo.list_dates("nettle").unwrap();
        assert_eq!(dates, vec![date(1, 1, 1), date(2024, 1, 9), date(9999, 12, 31)]);
        for d in dates {
            assert!(repo.get_by_date("nettle", d).unwrap().is_some());
        }
    }

    #[test]
    fn test_save_waits_for_user_lock() {
        let (_dir, repo) = temp_repo();
        repo.save(&workout("nettle", date(2024, 3, 4), "Squat", 185.0))
            .unwrap();

        let lock_path = repo.workouts_dir().join("nettle").join(LOCK_FILE);
        let held = File::open(&lock_path).unwrap();
        held.lock_exclusive().unwrap();

        let writer = {
            let repo = repo.clone();
            std::thread::spawn(move || {
                repo.save(&workout("nettle", date(2024, 3, 5), "Squat", 195.0))
                    .unwrap()
            })
        };

        std::thread::sleep(std::time::Duration::from_millis(200));
        let target = repo.workouts_dir().join("nettle/2024/03/05.json");
        assert!(!target.exists(), "save must not write while the lock is held");

        held.unlock().unwrap();
        writer.join().unwrap();
        assert!(target.is_file());
        assert_eq!(
            repo.list_dates("nettle").unwrap(),
            vec![date(2024, 3, 4), date(2024, 3, 5)]
        );
    }

    #[test]
    fn test_delete_unknown_user_creates_nothing() {
        let (_dir, repo) = temp_repo();
        assert!(!repo.delete("ghost", date(2024, 3, 5)).unwrap());
        assert!(!repo.workouts_dir().join("ghost").exists());
    }
}
