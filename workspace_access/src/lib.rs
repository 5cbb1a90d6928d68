//! Scoped access to user-granted directories.
//!
//! [`ScopeGuard`] brackets native access to a handle and releases it when
//! dropped. [`PermissionOracle`] answers whether a handle currently grants
//! read and write access without leaving anything changed on disk.

use core_types::{AccessError, AccessResult, ResourceHandle};
use services_logger::{LogEntry, LogLevel};
use services_storage::Storage;

/// Temporary access to a handle, released on drop
///
/// Acquiring the same handle twice and dropping both guards is safe; each
/// successful acquisition is released exactly once.
pub struct ScopeGuard<'s> {
    storage: &'s Storage,
    handle: ResourceHandle,
    granted: bool,
}

impl<'s> ScopeGuard<'s> {
    /// Starts native access for `handle`
    pub fn acquire(storage: &'s Storage, handle: &ResourceHandle) -> Self {
        let granted = storage.start_access(handle);
        if !granted {
            LogEntry::new(LogLevel::Debug, "scope not granted")
                .with_field("handle", handle)
                .with_field("kind", handle.kind())
                .emit();
        }
        Self {
            storage,
            handle: handle.clone(),
            granted,
        }
    }

    /// Whether access was granted
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Fails with `PermissionDenied` unless access was granted
    pub fn require(&self) -> AccessResult<()> {
        if self.granted {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied(format!(
                "Access not granted for {}",
                self.handle
            )))
        }
    }

    /// Handle this guard covers
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.granted {
            self.storage.stop_access(&self.handle);
        }
    }
}

/// Stateless read+write permission check
pub struct PermissionOracle<'s> {
    storage: &'s Storage,
}

impl<'s> PermissionOracle<'s> {
    pub fn new(storage: &'s Storage) -> Self {
        Self { storage }
    }

    /// Explains why a handle does not grant access, if it doesn't
    pub fn check(&self, handle: &ResourceHandle) -> AccessResult<()> {
        let guard = ScopeGuard::acquire(self.storage, handle);
        guard.require()?;

        let node = self.storage.resolve(handle)?;
        if self.storage.is_writable_directory(&node)? {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied(format!(
                "Not a writable directory: {}",
                handle
            )))
        }
    }

    /// Whether `handle` is an existing directory with read+write access
    pub fn has_permission(&self, handle: &ResourceHandle) -> bool {
        self.check(handle).is_ok()
    }

    /// Same as `has_permission`; never prompts again
    pub fn request_permission(&self, handle: &ResourceHandle) -> bool {
        self.has_permission(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ScopedUrl, TreeUri};
    use services_storage::{BookmarkStore, LocalDocumentProvider, SecurityScope, UriGrants};
    use std::fs;
    use std::sync::Arc;

    fn scoped_storage() -> (Storage, Arc<BookmarkStore>) {
        let bookmarks = Arc::new(BookmarkStore::new());
        let storage = Storage::new(Arc::new(UriGrants::new()), bookmarks.clone());
        (storage, bookmarks)
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, bookmarks) = scoped_storage();
        let url = ScopedUrl::from_directory_path(dir.path()).unwrap();
        bookmarks.grant(&url).unwrap();
        let handle = ResourceHandle::Scoped(url);

        {
            let guard = ScopeGuard::acquire(&storage, &handle);
            assert!(guard.is_granted());
            assert_eq!(bookmarks.active_checkouts(), 1);
        }
        assert_eq!(bookmarks.active_checkouts(), 0);
    }

    #[test]
    fn test_nested_guards() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, bookmarks) = scoped_storage();
        let url = ScopedUrl::from_directory_path(dir.path()).unwrap();
        bookmarks.grant(&url).unwrap();
        let handle = ResourceHandle::Scoped(url);

        let outer = ScopeGuard::acquire(&storage, &handle);
        let inner = ScopeGuard::acquire(&storage, &handle);
        assert_eq!(bookmarks.active_checkouts(), 2);
        drop(inner);
        assert!(bookmarks.is_accessing(dir.path()));
        drop(outer);
        assert_eq!(bookmarks.active_checkouts(), 0);
    }

    #[test]
    fn test_ungranted_guard() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, bookmarks) = scoped_storage();
        let handle = ResourceHandle::Scoped(ScopedUrl::from_directory_path(dir.path()).unwrap());

        let guard = ScopeGuard::acquire(&storage, &handle);
        assert!(!guard.is_granted());
        assert!(matches!(guard.require(), Err(AccessError::PermissionDenied(_))));
        drop(guard);
        assert_eq!(bookmarks.active_checkouts(), 0);
    }

    #[test]
    fn test_guard_released_on_panic() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, bookmarks) = scoped_storage();
        let url = ScopedUrl::from_directory_path(dir.path()).unwrap();
        bookmarks.grant(&url).unwrap();
        let handle = ResourceHandle::Scoped(url);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopeGuard::acquire(&storage, &handle);
            panic!("operation failed");
        }));
        assert!(result.is_err());
        assert_eq!(bookmarks.active_checkouts(), 0);
    }

    #[test]
    fn test_plain_path_permission() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, _) = scoped_storage();
        let oracle = PermissionOracle::new(&storage);

        let handle = ResourceHandle::Path(dir.path().to_path_buf());
        assert!(oracle.has_permission(&handle));
        assert!(oracle.request_permission(&handle));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let missing = ResourceHandle::Path(dir.path().join("missing"));
        assert!(!oracle.has_permission(&missing));
        assert!(matches!(oracle.check(&missing), Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_plain_file_is_not_permitted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let (storage, _) = scoped_storage();
        let oracle = PermissionOracle::new(&storage);
        let handle = ResourceHandle::Path(dir.path().join("a.txt"));
        assert!(matches!(
            oracle.check(&handle),
            Err(AccessError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_scoped_permission_follows_bookmark() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, bookmarks) = scoped_storage();
        let url = ScopedUrl::from_directory_path(dir.path()).unwrap();
        let handle = ResourceHandle::Scoped(url.clone());
        let oracle = PermissionOracle::new(&storage);

        assert!(!oracle.has_permission(&handle));
        bookmarks.grant(&url).unwrap();
        assert!(oracle.has_permission(&handle));
        assert_eq!(bookmarks.active_checkouts(), 0);

        bookmarks.revoke(&url).unwrap();
        assert!(!oracle.has_permission(&handle));
    }

    #[test]
    fn test_document_permission_requires_grant() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();
        let storage = Storage::new(Arc::new(UriGrants::new()), Arc::new(BookmarkStore::new()))
            .with_provider(Arc::new(
                LocalDocumentProvider::new("docs.local").with_volume("primary", dir.path()),
            ));
        let tree = TreeUri::new("docs.local", "primary:Docs");
        let handle = ResourceHandle::Document(tree.clone());
        let oracle = PermissionOracle::new(&storage);

        assert!(!oracle.has_permission(&handle));
        storage.grants().take_persistable(&tree).unwrap();
        assert!(oracle.has_permission(&handle));

        let missing = ResourceHandle::Document(tree.document("primary:Docs/missing"));
        assert!(!oracle.has_permission(&missing));
    }
}
