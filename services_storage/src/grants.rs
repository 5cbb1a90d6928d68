//! Persisted URI grants
//!
//! Document-provider trees are only usable after the grant for the tree root
//! has been taken as persistable. Grants can be saved to a JSON file so they
//! survive restarts.

use core_types::{AccessError, AccessResult, TreeUri};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct GrantFile {
    version: u32,
    grants: BTreeSet<String>,
}

const GRANT_FILE_VERSION: u32 = 1;

/// Table of persisted tree grants
#[derive(Debug, Default)]
pub struct UriGrants {
    granted: Mutex<BTreeSet<String>>,
    store: Option<PathBuf>,
}

impl UriGrants {
    /// Creates an in-memory grant table
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grant table backed by a JSON file, loading existing grants
    pub fn with_store(path: impl Into<PathBuf>) -> AccessResult<Self> {
        let path = path.into();
        let granted = match fs::read(&path) {
            Ok(bytes) => {
                let file: GrantFile = serde_json::from_slice(&bytes).map_err(|e| {
                    AccessError::io_failure(path.display().to_string(), e.to_string())
                })?;
                file.grants
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(AccessError::from_io(path.display().to_string(), e)),
        };
        Ok(Self {
            granted: Mutex::new(granted),
            store: Some(path),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.granted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(uri: &TreeUri) -> String {
        uri.tree_root().to_string()
    }

    /// Persists the grant for the tree `uri` belongs to
    pub fn take_persistable(&self, uri: &TreeUri) -> AccessResult<()> {
        let mut granted = self.lock();
        granted.insert(Self::key(uri));
        self.save(&granted)
    }

    /// Drops the grant for the tree `uri` belongs to
    pub fn release(&self, uri: &TreeUri) -> AccessResult<bool> {
        let mut granted = self.lock();
        let removed = granted.remove(&Self::key(uri));
        if removed {
            self.save(&granted)?;
        }
        Ok(removed)
    }

    /// Whether a grant exists for the tree `uri` belongs to
    pub fn is_granted(&self, uri: &TreeUri) -> bool {
        self.lock().contains(&Self::key(uri))
    }

    /// Serialized tree roots of every persisted grant
    pub fn persisted(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    fn save(&self, granted: &BTreeSet<String>) -> AccessResult<()> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        write_json(
            path,
            &GrantFile {
                version: GRANT_FILE_VERSION,
                grants: granted.clone(),
            },
        )
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> AccessResult<()> {
    let context = path.display().to_string();
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| AccessError::io_failure(context.clone(), e.to_string()))?;
    fs::write(path, bytes).map_err(|e| AccessError::from_io(context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_tree() -> TreeUri {
        TreeUri::new("docs.local", "primary:Docs")
    }

    #[test]
    fn test_grant_covers_documents_in_tree() {
        let grants = UriGrants::new();
        assert!(!grants.is_granted(&docs_tree()));

        grants.take_persistable(&docs_tree()).unwrap();
        assert!(grants.is_granted(&docs_tree()));
        assert!(grants.is_granted(&docs_tree().document("primary:Docs/sub")));
        assert!(!grants.is_granted(&TreeUri::new("docs.local", "primary:Other")));
    }

    #[test]
    fn test_release() {
        let grants = UriGrants::new();
        grants.take_persistable(&docs_tree()).unwrap();
        assert!(grants.release(&docs_tree()).unwrap());
        assert!(!grants.release(&docs_tree()).unwrap());
        assert!(!grants.is_granted(&docs_tree()));
    }

    #[test]
    fn test_grants_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.json");

        let grants = UriGrants::with_store(&path).unwrap();
        grants.take_persistable(&docs_tree()).unwrap();
        drop(grants);

        let reloaded = UriGrants::with_store(&path).unwrap();
        assert!(reloaded.is_granted(&docs_tree()));
        assert_eq!(reloaded.persisted(), vec![docs_tree().to_string()]);
    }

    #[test]
    fn test_corrupt_store_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            UriGrants::with_store(&path),
            Err(AccessError::IoFailure { .. })
        ));
    }
}
