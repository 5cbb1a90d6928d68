//! Traversal entries

use serde::{Deserialize, Serialize};

/// One child discovered by traversal
///
/// Entries are built fresh on every traversal call and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Leaf name
    pub name: String,
    /// Segments joined by `/` from the traversal root
    pub relative_path: String,
    /// Externally addressable string for re-traversal or reading
    pub path: String,
    /// Whether the entry is a directory
    pub is_directory: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Milliseconds since the Unix epoch (0 when unknown)
    pub last_modified: i64,
}

impl Entry {
    /// Creates a directory entry
    pub fn directory(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        path: impl Into<String>,
        last_modified: i64,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            path: path.into(),
            is_directory: true,
            size: 0,
            last_modified,
        }
    }

    /// Creates a file entry
    pub fn file(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        last_modified: i64,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            path: path.into(),
            is_directory: false,
            size,
            last_modified,
        }
    }
}
