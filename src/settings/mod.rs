//! Persistence seam for operator-tuned security settings.
//!
//! The authentication subsystem treats settings storage as an external
//! collaborator: anything that can load and save a [`SecurityPolicy`] works.
//! Two implementations ship here, a JSON file store for deployments and an
//! in-memory store for tests and secretless dev setups.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::auth::SecurityPolicy;
use crate::{PalisadeError, Result};

/// Storage for the runtime security policy.
pub trait SettingsStore: Send + Sync {
    /// Load the persisted policy, if any has been saved.
    fn load(&self) -> Result<Option<SecurityPolicy>>;

    /// Persist the policy.
    fn save(&self, policy: &SecurityPolicy) -> Result<()>;
}

/// JSON-file-backed settings store.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Create a store writing to the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Option<SecurityPolicy>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PalisadeError::Io(e)),
        };

        let policy = serde_json::from_str(&content)
            .map_err(|e| PalisadeError::Settings(format!("parse {}: {e}", self.path.display())))?;
        Ok(Some(policy))
    }

    fn save(&self, policy: &SecurityPolicy) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(policy)
            .map_err(|e| PalisadeError::Settings(format!("serialize: {e}")))?;
        std::fs::write(&self.path, content)?;

        debug!(path = %self.path.display(), "Security settings saved");
        Ok(())
    }
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    policy: Mutex<Option<SecurityPolicy>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<SecurityPolicy>> {
        Ok(*self.policy.lock().unwrap())
    }

    fn save(&self, policy: &SecurityPolicy) -> Result<()> {
        *self.policy.lock().unwrap() = Some(*policy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> SecurityPolicy {
        SecurityPolicy {
            session_timeout_minutes: 30,
            max_login_attempts: 3,
            lockout_duration_minutes: 10,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySettingsStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample_policy()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_policy()));
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("security.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("security.json"));

        store.save(&sample_policy()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_policy()));
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested/deeper/security.json"));

        store.save(&sample_policy()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_policy()));
    }

    #[test]
    fn test_file_store_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSettingsStore::new(&path);
        let result = store.load();
        assert!(matches!(result, Err(PalisadeError::Settings(_))));
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("security.json"));

        store.save(&sample_policy()).unwrap();
        let updated = SecurityPolicy {
            session_timeout_minutes: 90,
            ..sample_policy()
        };
        store.save(&updated).unwrap();

        assert_eq!(store.load().unwrap(), Some(updated));
    }
}
