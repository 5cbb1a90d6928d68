//! Resilience Test Utilities
//!
//! This crate provides shared fixtures for the cross-crate property tests.
//!
//! ## Test Philosophy
//!
//! - **Every storage model**: Each property runs against document trees,
//!   security-scoped URLs and plain paths
//! - **Deterministic failures**: Provider faults are injected through a
//!   `FailurePolicy`, never by racing the filesystem
//! - **No scope leaks**: Scopes are released even when operations fail
//! - **All or nothing**: A failed traversal never yields a partial result

use core_types::{HandleKind, Platform, ResourceHandle, ScopedUrl, TreeUri};
use services_file_picker::{ChooserOutcome, DirectorySelector, ScriptedChooser};
use services_fs_view::DirectoryAccessService;
use services_storage::{
    BookmarkStore, FailingDocumentProvider, FailurePolicy, LocalDocumentProvider, Storage,
    UriGrants,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Authority of the fixture document provider
pub const AUTHORITY: &str = "resilience.documents";

/// Provider type every document fixture is served by
pub type FaultyProvider = FailingDocumentProvider<LocalDocumentProvider>;

/// Every handle kind, in the order properties are checked
pub const ALL_KINDS: [HandleKind; 3] = [HandleKind::Document, HandleKind::Scoped, HandleKind::Path];

/// Platform whose selection flow produces `kind`
pub fn platform_for(kind: HandleKind) -> Platform {
    match kind {
        HandleKind::Document => Platform::Android,
        HandleKind::Scoped => Platform::Ios,
        HandleKind::Path => Platform::Linux,
    }
}

/// A directory served through one handle kind
pub struct Fixture {
    pub kind: HandleKind,
    pub service: DirectoryAccessService,
    pub bookmarks: Arc<BookmarkStore>,
    pub grants: Arc<UriGrants>,
    pub faults: Arc<FaultyProvider>,
    root: PathBuf,
    handle: ResourceHandle,
    _dir: TempDir,
}

impl Fixture {
    /// Fixture whose directory exists but was never granted
    pub fn ungranted(kind: HandleKind) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("Docs");
        fs::create_dir(&root).expect("Failed to create root");

        let faults = Arc::new(FailingDocumentProvider::new(
            LocalDocumentProvider::new(AUTHORITY).with_volume("primary", dir.path()),
            FailurePolicy::Never,
        ));
        let grants = Arc::new(UriGrants::new());
        let bookmarks = Arc::new(BookmarkStore::new());
        let storage =
            Storage::new(grants.clone(), bookmarks.clone()).with_provider(faults.clone());

        let handle = match kind {
            HandleKind::Document => {
                ResourceHandle::Document(TreeUri::new(AUTHORITY, "primary:Docs"))
            }
            HandleKind::Scoped => ResourceHandle::Scoped(
                ScopedUrl::from_directory_path(&root).expect("Failed to build URL"),
            ),
            HandleKind::Path => ResourceHandle::Path(root.clone()),
        };

        Self {
            kind,
            service: DirectoryAccessService::new(storage),
            bookmarks,
            grants,
            faults,
            root,
            handle,
            _dir: dir,
        }
    }

    /// Fixture whose directory has a persisted grant
    pub fn granted(kind: HandleKind) -> Self {
        let fixture = Self::ungranted(kind);
        fixture
            .service
            .storage()
            .persist_grant(&fixture.handle)
            .expect("Failed to persist grant");
        fixture
    }

    /// Handle string of the fixture directory
    pub fn base(&self) -> String {
        self.handle.to_string()
    }

    /// Address of a file below the fixture directory
    pub fn file(&self, relative_path: &str) -> String {
        self.handle.child_address(relative_path)
    }

    /// Local directory backing the handle
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Chooser location that selects the fixture directory
    pub fn location(&self) -> String {
        self.base()
    }

    /// Selector that answers with the given outcomes on this kind's platform
    pub fn selector(&self, outcomes: impl IntoIterator<Item = ChooserOutcome>) -> DirectorySelector {
        DirectorySelector::new(
            Arc::new(ScriptedChooser::new(outcomes)),
            platform_for(self.kind),
        )
    }

    /// Withdraws whatever grant backs the handle
    pub fn revoke(&self) {
        match &self.handle {
            ResourceHandle::Document(uri) => {
                self.grants.release(uri).expect("Failed to release grant");
            }
            ResourceHandle::Scoped(url) => {
                self.bookmarks.revoke(url).expect("Failed to revoke bookmark");
            }
            ResourceHandle::Path(path) => {
                fs::remove_dir_all(path).expect("Failed to remove directory");
            }
        }
    }
}
