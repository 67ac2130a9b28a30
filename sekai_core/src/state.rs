//! Learner progress persistence with file locking.
//!
//! The record is stored as JSON in the persisted-learner shape
//! `{ id, currentLevel, completedProjects, activityDays }`.

use crate::{Error, LearnerProgress, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl LearnerProgress {
    /// Load learner progress from a file with shared locking
    ///
    /// Returns a fresh learner at `starting_level` if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns a fresh learner.
    pub fn load(path: &Path, starting_level: u32) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No progress file found, creating learner at level {}", starting_level);
            return Ok(Self::new(starting_level));
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open progress file {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                return Ok(Self::new(starting_level));
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock progress file {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::new(starting_level));
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read progress file {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::new(starting_level));
        }

        file.unlock()?;

        match serde_json::from_str::<LearnerProgress>(&contents) {
            Ok(progress) => {
                tracing::debug!(
                    "Loaded learner {} at level {} from {:?}",
                    progress.id,
                    progress.current_level,
                    path
                );
                Ok(progress)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse progress file {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                Ok(Self::new(starting_level))
            }
        }
    }

    /// Save learner progress to a file with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("progress path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved learner {} to {:?}", self.id, path);
        Ok(())
    }

    /// Load progress, modify it, and save it back
    ///
    /// An exclusive lock on `<path>.lock` is held from load through save, so
    /// overlapping updates apply one after another instead of racing.
    pub fn update<F>(path: &Path, starting_level: u32, f: F) -> Result<Self>
    where
        F: FnOnce(&mut LearnerProgress) -> Result<()>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path(path))?;
        lock.lock_exclusive()?;

        let result = Self::load(path, starting_level).and_then(|mut progress| {
            f(&mut progress)?;
            progress.save(path)?;
            Ok(progress)
        });

        lock.unlock()?;
        result
    }
}

/// Sidecar lock file guarding read-modify-write cycles on `path`
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut progress = LearnerProgress::new(1);
        progress.complete_level();
        progress.complete_project("p1");
        progress.register_activity(&Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap());

        progress.save(&path).unwrap();
        let loaded = LearnerProgress::load(&path, 1).unwrap();

        assert_eq!(loaded, progress);
    }

    #[test]
    fn test_persisted_field_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut progress = LearnerProgress::new(4);
        progress.complete_project("b");
        progress.complete_project("a");
        progress.register_activity(&Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap());
        progress.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["currentLevel"], 4);
        assert_eq!(raw["completedProjects"], serde_json::json!(["a", "b"]));
        assert_eq!(raw["activityDays"], serde_json::json!(["2025-08-20"]));
        assert!(raw["id"].is_string());
    }

    #[test]
    fn test_load_nonexistent_creates_learner() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let progress = LearnerProgress::load(&path, 3).unwrap();
        assert_eq!(progress.current_level(), 3);
        assert!(progress.completed_projects().is_empty());
        assert_eq!(progress.total_active_days(), 0);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        let first = LearnerProgress::update(&path, 1, |p| {
            p.complete_level();
            Ok(())
        })
        .unwrap();

        let loaded = LearnerProgress::load(&path, 1).unwrap();
        assert_eq!(loaded.current_level(), 2);
        assert_eq!(loaded.id(), first.id());
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        std::thread::scope(|scope| {
            for i in 0..8 {
                let path = &path;
                scope.spawn(move || {
                    for j in 0..10 {
                        LearnerProgress::update(path, 1, |p| {
                            p.complete_project(format!("p{}-{}", i, j));
                            p.complete_level();
                            Ok(())
                        })
                        .unwrap();
                    }
                });
            }
        });

        let progress = LearnerProgress::load(&path, 1).unwrap();
        assert_eq!(progress.completed_projects().len(), 80);
        assert_eq!(progress.current_level(), 81);
    }

    #[test]
    fn test_lock_path_sits_next_to_progress_file() {
        let path = Path::new("/data/sekai/progress.json");
        assert_eq!(lock_path(path), PathBuf::from("/data/sekai/progress.json.lock"));
    }

    #[test]
    fn test_corrupted_progress_starts_fresh() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("corrupted.json");

        std::fs::write(&path, "{ invalid json }").unwrap();

        let progress = LearnerProgress::load(&path, 1).unwrap();
        assert_eq!(progress.current_level(), 1);
        assert!(progress.completed_projects().is_empty());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        LearnerProgress::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "progress.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only progress.json, found extras: {:?}",
            extras
        );
    }
}
