//! Directory selection flow

use crate::chooser::{ChooserOutcome, DirectoryChooser, SelectionRequest};
use crate::session::{SelectionError, SelectionSession};
use core_types::{AccessError, AccessResult, HandleKind, Platform, ResourceHandle, ScopedUrl};
use services_logger::{LogEntry, LogLevel};
use services_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

/// Drives one chooser through the selection state machine
pub struct DirectorySelector {
    session: Arc<SelectionSession>,
    chooser: Arc<dyn DirectoryChooser>,
    platform: Platform,
}

impl DirectorySelector {
    pub fn new(chooser: Arc<dyn DirectoryChooser>, platform: Platform) -> Self {
        Self {
            session: Arc::new(SelectionSession::new()),
            chooser,
            platform,
        }
    }

    pub fn session(&self) -> &Arc<SelectionSession> {
        &self.session
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Asks the user for a directory and persists the grant
    ///
    /// Blocks until the chooser completes. `Ok(None)` covers dismissal, an
    /// unpresentable chooser, and a choice whose grant could not be
    /// persisted.
    pub fn select(&self, storage: &Storage) -> Result<Option<ResourceHandle>, SelectionError> {
        let (code, receiver) = self.session.begin()?;

        if let Err(error) = self
            .chooser
            .present(SelectionRequest::new(code, self.session.clone()))
        {
            self.session.abandon(code);
            LogEntry::new(LogLevel::Debug, error.to_string())
                .with_operation("selectDirectory")
                .with_field("request", code)
                .emit();
            return Ok(None);
        }

        let outcome = match receiver.recv() {
            Ok(outcome) => outcome,
            Err(_) => {
                self.session.abandon(code);
                return Ok(None);
            }
        };

        let location = match outcome {
            ChooserOutcome::Chosen(location) => location,
            ChooserOutcome::Cancelled => {
                LogEntry::failure("selectDirectory", &AccessError::UserCancelled)
                    .with_field("request", code)
                    .emit();
                return Ok(None);
            }
        };

        let granted = self
            .to_handle(&location)
            .and_then(|handle| storage.persist_grant(&handle).map(|_| handle));
        match granted {
            Ok(handle) => {
                LogEntry::new(LogLevel::Info, "directory granted")
                    .with_operation("selectDirectory")
                    .with_field("handle", &handle)
                    .with_field("kind", handle.kind())
                    .emit();
                Ok(Some(handle))
            }
            Err(error) => {
                LogEntry::failure("selectDirectory", &error)
                    .with_field("location", &location)
                    .emit();
                Ok(None)
            }
        }
    }

    /// Converts a chooser location into a handle of this platform's kind
    pub fn to_handle(&self, location: &str) -> AccessResult<ResourceHandle> {
        let parsed = ResourceHandle::parse(location)?;
        match (self.platform.handle_kind(), parsed) {
            (HandleKind::Document, handle @ ResourceHandle::Document(_)) => Ok(handle),
            (HandleKind::Scoped, handle @ ResourceHandle::Scoped(_)) => Ok(handle),
            (HandleKind::Scoped, ResourceHandle::Path(path)) => {
                Ok(ResourceHandle::Scoped(ScopedUrl::from_directory_path(path)?))
            }
            (HandleKind::Path, handle @ ResourceHandle::Path(_)) => Ok(handle),
            (HandleKind::Path, ResourceHandle::Scoped(url)) => {
                Ok(ResourceHandle::Path(PathBuf::from(url.path())))
            }
            (kind, other) => Err(AccessError::InvalidHandle(format!(
                "{} location cannot back a {} handle",
                other.kind(),
                kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::{ChooserError, DeferredChooser, ScriptedChooser};
    use core_types::TreeUri;
    use services_storage::{BookmarkStore, LocalDocumentProvider, UriGrants};
    use std::fs;
    use std::thread;
    use std::time::Duration;

    fn storage() -> Storage {
        Storage::new(Arc::new(UriGrants::new()), Arc::new(BookmarkStore::new()))
    }

    #[test]
    fn test_plain_selection() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().to_string_lossy().into_owned();
        let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Chosen(location.clone())]));
        let selector = DirectorySelector::new(chooser, Platform::Linux);

        let handle = selector.select(&storage()).unwrap().unwrap();
        assert_eq!(handle.to_string(), location);
        assert!(!selector.session().is_pending());
    }

    #[test]
    fn test_cancel_leaves_no_pending_state() {
        let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Cancelled]));
        let selector = DirectorySelector::new(chooser, Platform::Macos);

        assert_eq!(selector.select(&storage()).unwrap(), None);
        assert!(!selector.session().is_pending());
    }

    #[test]
    fn test_unpresentable_chooser_is_cancellation() {
        let chooser = Arc::new(ScriptedChooser::default());
        chooser.push_failure(ChooserError::NoActiveWindow);
        let selector = DirectorySelector::new(chooser, Platform::Ios);

        assert_eq!(selector.select(&storage()).unwrap(), None);
        assert!(!selector.session().is_pending());
    }

    #[test]
    fn test_missing_directory_is_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").to_string_lossy().into_owned();
        let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Chosen(missing)]));
        let selector = DirectorySelector::new(chooser, Platform::Windows);

        assert_eq!(selector.select(&storage()).unwrap(), None);
    }

    #[test]
    fn test_scoped_selection_persists_bookmark() {
        let dir = tempfile::tempdir().unwrap();
        let bookmarks = Arc::new(BookmarkStore::new());
        let storage = Storage::new(Arc::new(UriGrants::new()), bookmarks.clone());
        let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Chosen(
            dir.path().to_string_lossy().into_owned(),
        )]));
        let selector = DirectorySelector::new(chooser, Platform::Ios);

        let handle = selector.select(&storage).unwrap().unwrap();
        assert!(matches!(handle, ResourceHandle::Scoped(_)));
        assert!(bookmarks.is_granted(dir.path()));
    }

    #[test]
    fn test_document_selection_persists_grant() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();
        let storage = storage().with_provider(Arc::new(
            LocalDocumentProvider::new("docs.local").with_volume("primary", dir.path()),
        ));
        let tree = TreeUri::new("docs.local", "primary:Docs");
        let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Chosen(tree.to_string())]));
        let selector = DirectorySelector::new(chooser, Platform::Android);

        let handle = selector.select(&storage).unwrap().unwrap();
        assert_eq!(handle.to_string(), tree.to_string());
        assert!(storage.grants().is_granted(&tree));
    }

    #[test]
    fn test_mismatched_kind_is_rejected() {
        let selector = DirectorySelector::new(Arc::new(ScriptedChooser::default()), Platform::Android);
        assert!(matches!(
            selector.to_handle("/plain/path"),
            Err(AccessError::InvalidHandle(_))
        ));

        let plain = DirectorySelector::new(Arc::new(ScriptedChooser::default()), Platform::Linux);
        assert!(matches!(
            plain.to_handle("content://docs.local/tree/primary%3A"),
            Err(AccessError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_second_selection_while_pending_is_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().to_string_lossy().into_owned();
        let chooser = Arc::new(DeferredChooser::new());
        let selector = Arc::new(DirectorySelector::new(chooser.clone(), Platform::Linux));
        let storage = Arc::new(storage());

        let waiting = {
            let selector = selector.clone();
            let storage = storage.clone();
            thread::spawn(move || selector.select(&storage))
        };

        let request = chooser.wait_request(Duration::from_secs(5)).unwrap();
        assert_eq!(selector.select(&storage), Err(SelectionError::InFlight));

        assert!(request.complete(ChooserOutcome::Chosen(location.clone())));
        let handle = waiting.join().unwrap().unwrap().unwrap();
        assert_eq!(handle.to_string(), location);
        assert!(!selector.session().is_pending());
    }
}
