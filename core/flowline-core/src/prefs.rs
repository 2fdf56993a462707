//! Preference persistence.
//!
//! The only durable state in the whole core is the panel visibility
//! boolean. It lives in a small JSON string map under the Flowline data
//! directory; the in-memory flag stays authoritative for the session, so
//! persistence failures are logged and otherwise ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fs_err as fs;
use tracing::warn;

use crate::error::{Result, VizError};

/// Identity key for the panel visibility preference.
pub const VISIBILITY_KEY: &str = "pipeline_visible";

const PREFS_FILE: &str = "prefs.json";

/// Whatever key-value persistence the host environment offers.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file-backed store.
///
/// Loading is graceful: a missing, empty, or corrupt file yields an empty
/// map. Saving is atomic (temp file + rename).
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FilePrefs {
    pub fn open(path: PathBuf) -> Self {
        let values = load_values(&path);
        Self { path, values }
    }

    /// The production location, `~/.flowline/prefs.json`.
    pub fn open_default() -> Option<Self> {
        dirs::home_dir().map(|home| Self::open(home.join(".flowline").join(PREFS_FILE)))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| VizError::Io {
                context: "creating preferences directory".to_string(),
                source,
            })?;
        }
        let payload = serde_json::to_vec_pretty(&self.values).map_err(|source| VizError::Json {
            context: "serializing preferences".to_string(),
            source,
        })?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(|source| VizError::Io {
            context: "writing preferences".to_string(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| VizError::Io {
            context: "committing preferences".to_string(),
            source,
        })?;
        Ok(())
    }
}

impl KeyValueStore for FilePrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

fn load_values(path: &Path) -> HashMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            warn!(error = %err, path = %path.display(), "Failed to read preferences");
            return HashMap::new();
        }
    };
    if content.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(err) => {
            warn!(error = %err, path = %path.display(), "Corrupt preferences file, using defaults");
            HashMap::new()
        }
    }
}

/// The visibility flag, read once at startup and written through on every
/// toggle.
///
/// Only a stored literal `"false"` hides the panel; absence or anything
/// unrecognized means visible.
pub struct VisibilityPref<S: KeyValueStore> {
    store: S,
    visible: bool,
}

impl<S: KeyValueStore> VisibilityPref<S> {
    pub fn load(store: S) -> Self {
        let visible = store.get(VISIBILITY_KEY).as_deref() != Some("false");
        Self { store, visible }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let value = if visible { "true" } else { "false" };
        if let Err(err) = self.store.set(VISIBILITY_KEY, value) {
            warn!(error = %err, "Failed to persist pipeline visibility");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_defaults_to_true() {
        let pref = VisibilityPref::load(MemoryPrefs::default());
        assert!(pref.is_visible());
    }

    #[test]
    fn stored_false_hides_the_panel() {
        let mut store = MemoryPrefs::default();
        store.set(VISIBILITY_KEY, "false").expect("set");
        let pref = VisibilityPref::load(store);
        assert!(!pref.is_visible());
    }

    #[test]
    fn unrecognized_stored_value_means_visible() {
        let mut store = MemoryPrefs::default();
        store.set(VISIBILITY_KEY, "garbage").expect("set");
        let pref = VisibilityPref::load(store);
        assert!(pref.is_visible());
    }

    #[test]
    fn toggle_round_trips_through_the_file_store() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("prefs.json");

        let mut pref = VisibilityPref::load(FilePrefs::open(path.clone()));
        assert!(pref.is_visible());
        pref.set_visible(false);

        let reloaded = VisibilityPref::load(FilePrefs::open(path));
        assert!(!reloaded.is_visible());
    }

    #[test]
    fn corrupt_prefs_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("prefs.json");
        fs::write(&path, "{not json").expect("write");

        let pref = VisibilityPref::load(FilePrefs::open(path));
        assert!(pref.is_visible());
    }

    #[test]
    fn write_failure_keeps_the_in_memory_flag_authoritative() {
        // A directory path cannot be written as a file, so every save fails.
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let mut pref = VisibilityPref::load(FilePrefs::open(temp_dir.path().to_path_buf()));
        pref.set_visible(false);
        assert!(!pref.is_visible());
    }

    #[test]
    fn other_keys_survive_a_toggle() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("prefs.json");

        let mut store = FilePrefs::open(path.clone());
        store.set("theme", "dark").expect("set theme");
        let mut pref = VisibilityPref::load(store);
        pref.set_visible(false);

        let reloaded = FilePrefs::open(path);
        assert_eq!(reloaded.get("theme").as_deref(), Some("dark"));
        assert_eq!(reloaded.get(VISIBILITY_KEY).as_deref(), Some("false"));
    }
}
