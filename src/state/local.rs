use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::{Result, SsmSshError};

/// State file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct State {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// When any value was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl State {
    /// Load state from file. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let state: State = serde_json::from_str(&content).map_err(|e| {
            SsmSshError::StateCorrupted(format!("Failed to parse state file: {}", e))
        })?;

        Ok(state)
    }

    /// Save state to file with restricted permissions (0600)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
        }

        Ok(())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
        self.updated_at = Some(Utc::now());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// File-backed state store for runs outside a CI platform
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_path() -> Self {
        Self::new(state_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_state(&self, name: &str, value: &str) -> Result<()> {
        let mut state = State::load(&self.path)?;
        state.set(name, value);
        state.save(&self.path)?;
        tracing::debug!(name, path = %self.path.display(), "saved state");
        Ok(())
    }

    pub fn get_state(&self, name: &str) -> Result<Option<String>> {
        let state = State::load(&self.path)?;
        Ok(state.get(name).map(String::from))
    }
}

/// Get the path to the state file
fn state_file_path() -> PathBuf {
    // Use XDG state directory: ~/.local/state/ssm-ssh/state.json
    let base_dir = ProjectDirs::from("", "", "ssm-ssh")
        .and_then(|dirs| dirs.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".local")
                .join("state")
                .join("ssm-ssh")
        });

    base_dir.join("state.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStateStore::new(dir.path().join("state.json"));
        assert_eq!(store.get_state("keyIdentifier").unwrap(), None);
    }

    #[test]
    fn test_save_and_get_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStateStore::new(dir.path().join("nested").join("state.json"));

        store.save_state("keyIdentifier", "gh-actions-ssm-host-abc-local").unwrap();
        store.save_state("setupComplete", "true").unwrap();

        assert_eq!(
            store.get_state("keyIdentifier").unwrap().as_deref(),
            Some("gh-actions-ssm-host-abc-local")
        );
        assert_eq!(store.get_state("setupComplete").unwrap().as_deref(), Some("true"));

        let state = State::load(store.path()).unwrap();
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn test_overwrite_keeps_other_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStateStore::new(dir.path().join("state.json"));

        store.save_state("a", "1").unwrap();
        store.save_state("b", "2").unwrap();
        store.save_state("a", "3").unwrap();

        assert_eq!(store.get_state("a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get_state("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = State::load(&path).unwrap_err();
        assert!(matches!(err, SsmSshError::StateCorrupted(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_state_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = LocalStateStore::new(dir.path().join("state.json"));
        store.save_state("a", "1").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
