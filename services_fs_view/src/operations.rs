//! Directory operations
//!
//! This module defines the typed operations behind the service boundary.

use core_types::{AccessResult, Entry};

/// Directory operations trait
///
/// Handles are passed in their serialized form; a malformed handle fails
/// with `InvalidHandle`.
pub trait DirectoryOperations {
    /// Checks that `directory` is an existing directory with read+write access
    fn check_permission(&self, directory: &str) -> AccessResult<()>;

    /// Writes `content` to `file_name` inside `directory`
    ///
    /// Any existing file of that name is fully replaced.
    fn try_write_file(&self, directory: &str, file_name: &str, content: &str)
        -> AccessResult<()>;

    /// Reads the whole content of `file` as UTF-8 text
    fn try_read_file(&self, file: &str) -> AccessResult<String>;

    /// Relative paths below `directory`
    fn try_list_directory(&self, directory: &str, recursive: bool) -> AccessResult<Vec<String>>;

    /// Entry records below `directory`
    fn try_directory_details(&self, directory: &str, recursive: bool)
        -> AccessResult<Vec<Entry>>;
}
