//! Resolved storage nodes
//!
//! A handle resolves to a [`StorageNode`]; traversal and I/O only ever see
//! nodes, never the raw handle strings.

use core_types::TreeUri;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// A resolved location in one of the three storage models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNode {
    /// A document inside a granted tree
    Document { tree: TreeUri, document_id: String },
    /// A path reached through a security-scoped checkout
    Scoped(PathBuf),
    /// An unsandboxed path
    Local(PathBuf),
}

impl fmt::Display for StorageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageNode::Document { tree, document_id } => {
                write!(f, "{} ({})", document_id, tree.authority())
            }
            StorageNode::Scoped(path) | StorageNode::Local(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// Metadata of a node as reported by its storage model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Leaf name, absent when it cannot be decoded
    pub name: Option<String>,
    /// Whether the node is a directory
    pub is_directory: bool,
    /// Size in bytes, when known
    pub size: Option<u64>,
    /// Last modification time, when known
    pub last_modified: Option<SystemTime>,
}

/// Checks that `name` is a single leaf name
///
/// Rejects empty names, `.` and `..`, and anything containing a path
/// separator of either platform or a NUL byte.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
