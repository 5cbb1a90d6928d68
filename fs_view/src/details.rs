//! Per-entry metadata collection

use crate::walker::DirectoryWalker;
use core_types::{AccessResult, Entry, ResourceHandle};
use services_storage::Storage;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, truncated toward zero
///
/// Unknown times map to 0; times before the epoch are negative.
pub fn millis_since_epoch(time: Option<SystemTime>) -> i64 {
    let Some(time) = time else {
        return 0;
    };
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis())
            .map(|millis| -millis)
            .unwrap_or(i64::MIN),
    }
}

/// Traversal that produces full [`Entry`] records
pub struct MetadataCollector<'s> {
    walker: DirectoryWalker<'s>,
}

impl<'s> MetadataCollector<'s> {
    pub fn new(storage: &'s Storage) -> Self {
        Self {
            walker: DirectoryWalker::new(storage),
        }
    }

    /// Sets the name reported for entries without a decodable name
    pub fn with_unknown_name(mut self, name: impl Into<String>) -> Self {
        self.walker = self.walker.with_unknown_name(name);
        self
    }

    /// Entries below `handle`
    ///
    /// Directory entries carry their own re-traversable handle as `path`;
    /// file entries carry the handle string joined with their relative path.
    pub fn details(&self, handle: &ResourceHandle, recursive: bool) -> AccessResult<Vec<Entry>> {
        let storage = self.walker.storage();
        self.walker.walk(handle, recursive, |visit| {
            let last_modified = millis_since_epoch(visit.info.last_modified);
            if visit.info.is_directory {
                Ok(Entry::directory(
                    visit.name,
                    visit.relative_path,
                    storage.address(visit.node)?,
                    last_modified,
                ))
            } else {
                Ok(Entry::file(
                    visit.name,
                    visit.relative_path,
                    handle.child_address(visit.relative_path),
                    visit.info.size.unwrap_or(0),
                    last_modified,
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_storage::{BookmarkStore, UriGrants};
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    fn storage() -> Storage {
        Storage::new(Arc::new(UriGrants::new()), Arc::new(BookmarkStore::new()))
    }

    #[test]
    fn test_millis_truncate_toward_zero() {
        assert_eq!(millis_since_epoch(None), 0);
        assert_eq!(
            millis_since_epoch(Some(UNIX_EPOCH + Duration::from_micros(1_999))),
            1
        );
        assert_eq!(
            millis_since_epoch(Some(UNIX_EPOCH - Duration::from_micros(1_999))),
            -1
        );
    }

    #[test]
    fn test_details_of_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let before = SystemTime::now();
        fs::write(dir.path().join("five.txt"), "12345").unwrap();
        let storage = storage();

        let handle = ResourceHandle::Path(dir.path().to_path_buf());
        let entries = MetadataCollector::new(&storage).details(&handle, false).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.name, "five.txt");
        assert_eq!(entry.relative_path, "five.txt");
        assert!(!entry.is_directory);
        assert_eq!(entry.size, 5);
        let written = millis_since_epoch(Some(before));
        assert!((entry.last_modified - written).abs() < 5_000);
        assert_eq!(entry.path, handle.child_address("five.txt"));
    }

    #[test]
    fn test_directory_entry_path_is_retraversable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();
        let storage = storage();
        let collector = MetadataCollector::new(&storage);

        let handle = ResourceHandle::Path(dir.path().to_path_buf());
        let entries = collector.details(&handle, true).unwrap();
        let sub = entries.iter().find(|e| e.name == "sub").unwrap();
        assert!(sub.is_directory);
        assert_eq!(sub.size, 0);

        let nested = ResourceHandle::parse(&sub.path).unwrap();
        let inner = collector.details(&nested, false).unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].relative_path, "b.txt");

        let b = entries.iter().find(|e| e.relative_path == "sub/b.txt").unwrap();
        assert_eq!(fs::read_to_string(&b.path).unwrap(), "b");
    }
}
