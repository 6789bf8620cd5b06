use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::task::Task;
use crate::error::{Error, Result};

/// Load/save boundary to the durable JSON slot: one file holding the full
/// task list as a JSON array.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the slot. A missing file is a normal first run; unreadable or
    /// corrupt content degrades to an empty list. Never errors to the caller.
    pub fn load(&self) -> Vec<Task> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!(
                    "Discarding corrupt task slot {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Write the full list. A failure here never rolls back the in-memory
    /// state; the caller reports it and carries on.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(tasks).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Pretty-printed snapshot for backup, named by date.
    pub fn export(&self, tasks: &[Task], dir: &Path, today: NaiveDate) -> Result<PathBuf> {
        let name = format!("track-list-backup-{}.json", today.format("%Y-%m-%d"));
        let path = dir.join(name);
        let json = serde_json::to_string_pretty(tasks).map_err(std::io::Error::other)?;
        fs::write(&path, json)?;
        log::info!("Exported {} tasks to {}", tasks.len(), path.display());
        Ok(path)
    }

    /// Decode a user-supplied snapshot. Content that is not a JSON array of
    /// task records is a validation failure, not a persistence one.
    pub fn import(path: &Path) -> Result<Vec<Task>> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::validation(format!("Not a task list snapshot: {e}")))
    }
}
