//! Security-scoped access
//!
//! Scoped URLs are filesystem-addressable, but every use must be bracketed
//! by a checkout and a matching check-in. [`BookmarkStore`] keeps the granted
//! roots and a reference-counted table of active checkouts.

use crate::grants::write_json;
use core_types::{AccessError, AccessResult, ScopedUrl};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Checkout primitive for security-scoped URLs
pub trait SecurityScope: Send + Sync {
    /// Begins access; returns false when the URL is not covered by a grant
    fn start_accessing(&self, url: &ScopedUrl) -> bool;

    /// Ends access started by a successful `start_accessing`
    fn stop_accessing(&self, url: &ScopedUrl);

    /// Whether `path` lies under an active checkout
    fn is_accessing(&self, path: &Path) -> bool;

    /// Persists a bookmark for a user-chosen directory
    fn grant(&self, url: &ScopedUrl) -> AccessResult<()>;
}

#[derive(Debug, Default)]
struct BookmarkState {
    roots: BTreeSet<PathBuf>,
    checkouts: BTreeMap<PathBuf, usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BookmarkFile {
    version: u32,
    bookmarks: BTreeSet<PathBuf>,
}

const BOOKMARK_FILE_VERSION: u32 = 1;

/// Granted bookmarks plus the active checkout table
#[derive(Debug, Default)]
pub struct BookmarkStore {
    state: Mutex<BookmarkState>,
    store: Option<PathBuf>,
}

impl BookmarkStore {
    /// Creates an in-memory bookmark store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bookmark store backed by a JSON file, loading existing bookmarks
    pub fn with_store(path: impl Into<PathBuf>) -> AccessResult<Self> {
        let path = path.into();
        let roots = match fs::read(&path) {
            Ok(bytes) => {
                let file: BookmarkFile = serde_json::from_slice(&bytes).map_err(|e| {
                    AccessError::io_failure(path.display().to_string(), e.to_string())
                })?;
                file.bookmarks
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(AccessError::from_io(path.display().to_string(), e)),
        };
        Ok(Self {
            state: Mutex::new(BookmarkState {
                roots,
                checkouts: BTreeMap::new(),
            }),
            store: Some(path),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BookmarkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a bookmark covers `path`
    pub fn is_granted(&self, path: &Path) -> bool {
        self.lock().roots.iter().any(|root| path.starts_with(root))
    }

    /// Withdraws the bookmark for `url`; active checkouts stay until checked in
    pub fn revoke(&self, url: &ScopedUrl) -> AccessResult<bool> {
        let mut state = self.lock();
        let removed = state.roots.remove(url.path());
        if removed {
            self.save(&state.roots)?;
        }
        Ok(removed)
    }

    /// Number of outstanding checkouts across all URLs
    pub fn active_checkouts(&self) -> usize {
        self.lock().checkouts.values().sum()
    }

    /// Bookmarked roots
    pub fn bookmarks(&self) -> Vec<PathBuf> {
        self.lock().roots.iter().cloned().collect()
    }

    fn save(&self, roots: &BTreeSet<PathBuf>) -> AccessResult<()> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        write_json(
            path,
            &BookmarkFile {
                version: BOOKMARK_FILE_VERSION,
                bookmarks: roots.clone(),
            },
        )
    }
}

impl SecurityScope for BookmarkStore {
    fn start_accessing(&self, url: &ScopedUrl) -> bool {
        let mut state = self.lock();
        let path = url.path();
        if !state.roots.iter().any(|root| path.starts_with(root)) {
            return false;
        }
        *state.checkouts.entry(path.to_path_buf()).or_insert(0) += 1;
        true
    }

    fn stop_accessing(&self, url: &ScopedUrl) {
        let mut state = self.lock();
        let path = url.path();
        if let Some(count) = state.checkouts.get_mut(path) {
            *count -= 1;
            if *count == 0 {
                state.checkouts.remove(path);
            }
        }
    }

    fn is_accessing(&self, path: &Path) -> bool {
        self.lock()
            .checkouts
            .keys()
            .any(|checked_out| path.starts_with(checked_out))
    }

    fn grant(&self, url: &ScopedUrl) -> AccessResult<()> {
        let path = url.path();
        let meta = fs::metadata(path)
            .map_err(|e| AccessError::from_io(url.to_string(), e))?;
        if !meta.is_dir() {
            return Err(AccessError::NotFound(url.to_string()));
        }

        let mut state = self.lock();
        state.roots.insert(path.to_path_buf());
        self.save(&state.roots)
    }
}
