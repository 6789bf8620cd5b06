use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

static DEFAULT_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("tracklist")
});

fn default_data_dir() -> PathBuf {
    DEFAULT_DATA_DIR.clone()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TrackConfig {
    pub data_directory: PathBuf,
    pub debug_logging: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
        }
    }
}

impl TrackConfig {
    /// Read the config file, falling back to defaults when it is absent or
    /// unreadable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// The durable slot holding the task list.
    pub fn tasks_path(&self) -> PathBuf {
        self.data_directory.join("tasks.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tracklist").join("config.json"))
}
