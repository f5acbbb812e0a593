//! Per-expert state store
//!
//! Each learning expert owns one JSON file mapping strategy name to its
//! parameters. Loading never fails: a missing file starts fresh and a corrupt
//! one is logged and reset. Writes go through a temp file and a rename so a
//! crash mid-write leaves the previous state intact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CouncilError, Result};

/// State file for one expert, held in memory between writes
#[derive(Debug)]
pub struct StateFile<T> {
    expert: &'static str,
    path: Option<PathBuf>,
    data: T,
}

impl<T> StateFile<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    /// Load state from `path`, falling back to empty state
    pub fn open(expert: &'static str, path: PathBuf) -> Self {
        let data = load_or_default(expert, &path);
        Self {
            expert,
            path: Some(path),
            data,
        }
    }

    /// State that lives only as long as the process
    pub fn in_memory(expert: &'static str) -> Self {
        Self {
            expert,
            path: None,
            data: T::default(),
        }
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Atomically replace the on-disk state with the in-memory copy
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let persist_err = |source| CouncilError::Persist {
            expert: self.expert.to_string(),
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(persist_err)?;
        }

        let json = serde_json::to_vec_pretty(&self.data).map_err(|source| {
            CouncilError::Serialize {
                expert: self.expert.to_string(),
                source,
            }
        })?;

        let temp_path = path.with_extension("json.tmp");
        let written = std::fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| std::fs::rename(&temp_path, path)) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(persist_err(e));
        }

        debug!("[{}] state saved to {}", self.expert, path.display());
        Ok(())
    }
}

fn load_or_default<T: Default + DeserializeOwned>(expert: &str, path: &Path) -> T {
    if !path.exists() {
        info!("[{}] no existing state at {}, starting fresh", expert, path.display());
        return T::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("[{}] failed to read state {}: {}; resetting", expert, path.display(), e);
            return T::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(data) => {
            info!("[{}] state loaded from {}", expert, path.display());
            data
        }
        Err(e) => {
            warn!("[{}] corrupt state in {}: {}; resetting", expert, path.display(), e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Counts = HashMap<String, u32>;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: StateFile<Counts> = StateFile::open("habit", dir.path().join("habit.json"));
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_corrupt_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habit.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store: StateFile<Counts> = StateFile::open("habit", path);
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("habit.json");

        let mut store: StateFile<Counts> = StateFile::open("habit", path.clone());
        store.get_mut().insert("Visual Timer".to_string(), 3);
        store.persist().unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded: StateFile<Counts> = StateFile::open("habit", path);
        assert_eq!(reloaded.get().get("Visual Timer"), Some(&3));
    }

    #[test]
    fn test_in_memory_persist_is_noop() {
        let mut store: StateFile<Counts> = StateFile::in_memory("habit");
        store.get_mut().insert("X".to_string(), 1);
        store.persist().unwrap();
        assert!(store.path().is_none());
    }

    #[test]
    fn test_persist_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the state directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();

        let store: StateFile<Counts> = StateFile::open("habit", blocker.join("habit.json"));
        let err = store.persist().unwrap_err();
        assert!(matches!(err, CouncilError::Persist { .. }));
        assert!(err.to_string().contains("habit"));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail
        let path = dir.path().join("habit.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "").unwrap();

        let mut store: StateFile<Counts> = StateFile::open("habit", path.clone());
        store.get_mut().insert("X".to_string(), 1);
        let err = store.persist().unwrap_err();

        assert!(matches!(err, CouncilError::Persist { .. }));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("keep").exists());
    }
}
