//! # Storage Dispatch
//!
//! One storage interface over the three handle kinds. Traversal and I/O are
//! written once against [`StorageNode`]; this module decides per variant
//! whether a call goes to a document provider, a scoped path or a plain path.
//!
//! Scoped paths are only touched while a checkout covering them is active.

use crate::documents::{DocumentProvider, DocumentRecord, LocalDocumentProvider};
use crate::grants::UriGrants;
use crate::node::{is_valid_name, NodeInfo, StorageNode};
use crate::security_scope::{BookmarkStore, SecurityScope};
use core_types::{unique_name, AccessError, AccessResult, ResourceHandle, ScopedUrl};
use services_settings::PickerSettings;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tagged dispatch over document providers, scoped paths and plain paths
pub struct Storage {
    providers: BTreeMap<String, Arc<dyn DocumentProvider>>,
    grants: Arc<UriGrants>,
    scope: Arc<dyn SecurityScope>,
    document_mime_type: String,
    probe_prefix: String,
    create_missing_directories: bool,
}

impl Storage {
    /// Creates a storage without document providers
    pub fn new(grants: Arc<UriGrants>, scope: Arc<dyn SecurityScope>) -> Self {
        Self {
            providers: BTreeMap::new(),
            grants,
            scope,
            document_mime_type: services_settings::DEFAULT_DOCUMENT_MIME_TYPE.to_string(),
            probe_prefix: services_settings::DEFAULT_PROBE_PREFIX.to_string(),
            create_missing_directories: true,
        }
    }

    /// Builds the storage described by the settings
    ///
    /// Registers a local document provider when volumes are configured and
    /// opens the grant and bookmark stores.
    pub fn from_settings(settings: &PickerSettings) -> AccessResult<Self> {
        let grants = match &settings.grant_store {
            Some(path) => UriGrants::with_store(path)?,
            None => UriGrants::new(),
        };
        let bookmarks = match &settings.bookmark_store {
            Some(path) => BookmarkStore::with_store(path)?,
            None => BookmarkStore::new(),
        };

        let mut storage = Self::new(Arc::new(grants), Arc::new(bookmarks))
            .with_document_mime_type(settings.document_mime_type.clone())
            .with_probe_prefix(settings.probe_prefix.clone())
            .with_create_missing_directories(settings.create_missing_directories);

        if !settings.document_volumes.is_empty() {
            storage = storage.with_provider(Arc::new(LocalDocumentProvider::with_volumes(
                settings.document_authority.clone(),
                settings.document_volumes.clone(),
            )));
        }
        Ok(storage)
    }

    /// Registers a document provider under its authority
    pub fn with_provider(mut self, provider: Arc<dyn DocumentProvider>) -> Self {
        self.providers
            .insert(provider.authority().to_string(), provider);
        self
    }

    /// Sets the MIME type of documents created on write
    pub fn with_document_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.document_mime_type = mime_type.into();
        self
    }

    /// Sets the prefix of writability probe files
    pub fn with_probe_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.probe_prefix = prefix.into();
        self
    }

    /// Sets whether plain paths create missing directories on write
    pub fn with_create_missing_directories(mut self, create: bool) -> Self {
        self.create_missing_directories = create;
        self
    }

    /// Persisted URI grants
    pub fn grants(&self) -> &Arc<UriGrants> {
        &self.grants
    }

    /// Security scope used for scoped handles
    pub fn scope(&self) -> &Arc<dyn SecurityScope> {
        &self.scope
    }

    fn provider(&self, authority: &str) -> AccessResult<&Arc<dyn DocumentProvider>> {
        self.providers.get(authority).ok_or_else(|| {
            AccessError::InvalidHandle(format!("No document provider for {}", authority))
        })
    }

    fn ensure_accessing(&self, path: &Path) -> AccessResult<()> {
        if self.scope.is_accessing(path) {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied(format!(
                "No active checkout for {}",
                path.display()
            )))
        }
    }

    /// Begins native access for a handle; false means ungranted
    pub fn start_access(&self, handle: &ResourceHandle) -> bool {
        match handle {
            ResourceHandle::Document(tree) => {
                self.providers.contains_key(tree.authority()) && self.grants.is_granted(tree)
            }
            ResourceHandle::Scoped(url) => self.scope.start_accessing(url),
            ResourceHandle::Path(_) => true,
        }
    }

    /// Ends native access started by a successful `start_access`
    pub fn stop_access(&self, handle: &ResourceHandle) {
        if let ResourceHandle::Scoped(url) = handle {
            self.scope.stop_accessing(url);
        }
    }

    /// Persists the grant a user just made for `handle`
    pub fn persist_grant(&self, handle: &ResourceHandle) -> AccessResult<()> {
        match handle {
            ResourceHandle::Document(tree) => {
                let provider = self.provider(tree.authority())?;
                let record = provider.query(tree.document_id())?;
                if !record.is_directory {
                    return Err(AccessError::NotFound(format!("Not a directory: {}", tree)));
                }
                self.grants.take_persistable(tree)
            }
            ResourceHandle::Scoped(url) => self.scope.grant(url),
            ResourceHandle::Path(path) => {
                let meta =
                    fs::metadata(path).map_err(|e| AccessError::from_io(display(path), e))?;
                if meta.is_dir() {
                    Ok(())
                } else {
                    Err(AccessError::NotFound(format!("Not a directory: {}", display(path))))
                }
            }
        }
    }

    /// Resolves a handle to the node it addresses
    ///
    /// Trailing names of a tree URI are looked up by display name, one
    /// level at a time.
    pub fn resolve(&self, handle: &ResourceHandle) -> AccessResult<StorageNode> {
        match handle {
            ResourceHandle::Document(tree) => {
                if !self.grants.is_granted(tree) {
                    return Err(AccessError::PermissionDenied(format!(
                        "No persisted grant for {}",
                        tree.tree_root()
                    )));
                }
                let provider = self.provider(tree.authority())?;
                if !tree.contains_document(tree.document_id()) {
                    return Err(AccessError::InvalidHandle(format!(
                        "Document outside of granted tree: {}",
                        tree
                    )));
                }

                let mut current = tree.document_id().to_string();
                for name in tree.trailing() {
                    current = find_child(provider.as_ref(), &current, name)?
                        .ok_or_else(|| AccessError::NotFound(tree.to_string()))?
                        .document_id;
                }
                Ok(StorageNode::Document {
                    tree: tree.tree_root(),
                    document_id: current,
                })
            }
            ResourceHandle::Scoped(url) => {
                self.ensure_accessing(url.path())?;
                Ok(StorageNode::Scoped(url.path().to_path_buf()))
            }
            ResourceHandle::Path(path) => Ok(StorageNode::Local(path.clone())),
        }
    }

    /// Metadata of a node
    pub fn info(&self, node: &StorageNode) -> AccessResult<NodeInfo> {
        match node {
            StorageNode::Document { tree, document_id } => {
                let record = self.provider(tree.authority())?.query(document_id)?;
                Ok(record_info(record))
            }
            StorageNode::Scoped(path) => {
                self.ensure_accessing(path)?;
                path_info(path)
            }
            StorageNode::Local(path) => path_info(path),
        }
    }

    /// Immediate children of a directory node, in native order
    pub fn children(&self, node: &StorageNode) -> AccessResult<Vec<(StorageNode, NodeInfo)>> {
        match node {
            StorageNode::Document { tree, document_id } => {
                let records = self.provider(tree.authority())?.query_children(document_id)?;
                Ok(records
                    .into_iter()
                    .map(|record| {
                        let child = StorageNode::Document {
                            tree: tree.clone(),
                            document_id: record.document_id.clone(),
                        };
                        (child, record_info(record))
                    })
                    .collect())
            }
            StorageNode::Scoped(path) => {
                self.ensure_accessing(path)?;
                path_children(path, StorageNode::Scoped)
            }
            StorageNode::Local(path) => path_children(path, StorageNode::Local),
        }
    }

    /// Re-traversable handle string of a directory node
    pub fn address(&self, node: &StorageNode) -> AccessResult<String> {
        match node {
            StorageNode::Document { tree, document_id } => {
                Ok(tree.document(document_id.clone()).to_string())
            }
            StorageNode::Scoped(path) => Ok(ScopedUrl::from_directory_path(path)?.to_string()),
            StorageNode::Local(path) => Ok(path.to_string_lossy().into_owned()),
        }
    }

    /// Whole content of a file node
    pub fn read(&self, node: &StorageNode) -> AccessResult<Vec<u8>> {
        match node {
            StorageNode::Document { tree, document_id } => {
                let provider = self.provider(tree.authority())?;
                if provider.query(document_id)?.is_directory {
                    return Err(AccessError::io_failure(document_id.clone(), "Is a directory"));
                }
                provider.read_document(document_id)
            }
            StorageNode::Scoped(path) => {
                self.ensure_accessing(path)?;
                fs::read(path).map_err(|e| AccessError::from_io(display(path), e))
            }
            StorageNode::Local(path) => {
                fs::read(path).map_err(|e| AccessError::from_io(display(path), e))
            }
        }
    }

    /// Whole content of a file node decoded as UTF-8
    pub fn read_text(&self, node: &StorageNode) -> AccessResult<String> {
        let bytes = self.read(node)?;
        String::from_utf8(bytes).map_err(|_| AccessError::invalid_text(node.to_string()))
    }

    /// Whether a node is an existing directory that accepts new files
    ///
    /// Plain paths are tested by creating and removing a probe file; the
    /// other models ask their native writability query.
    pub fn is_writable_directory(&self, node: &StorageNode) -> AccessResult<bool> {
        if !self.info(node)?.is_directory {
            return Ok(false);
        }
        match node {
            StorageNode::Document { tree, document_id } => {
                self.provider(tree.authority())?.is_writable(document_id)
            }
            StorageNode::Scoped(path) => {
                let meta = fs::metadata(path).map_err(|e| AccessError::from_io(display(path), e))?;
                Ok(!meta.permissions().readonly())
            }
            StorageNode::Local(path) => Ok(self.probe_writable(path)),
        }
    }

    fn probe_writable(&self, dir: &Path) -> bool {
        let probe = dir.join(unique_name(&self.probe_prefix));
        let written = File::create(&probe).and_then(|mut file| file.write_all(b"test"));
        let removed = fs::remove_file(&probe).is_ok();
        written.is_ok() && removed
    }

    /// Writes `content` to `file_name` inside a directory node
    ///
    /// Any existing file is fully replaced: documents are deleted and
    /// recreated, path-backed files are replaced by renaming a sibling
    /// temporary file over them.
    pub fn write_file(&self, dir: &StorageNode, file_name: &str, content: &str) -> AccessResult<()> {
        if !is_valid_name(file_name) {
            return Err(AccessError::InvalidHandle(format!(
                "Illegal file name: {}",
                file_name
            )));
        }

        match dir {
            StorageNode::Document { tree, document_id } => {
                let provider = self.provider(tree.authority())?;
                if !provider.query(document_id)?.is_directory {
                    return Err(AccessError::NotFound(format!(
                        "Not a directory: {}",
                        document_id
                    )));
                }
                if let Some(existing) = find_child(provider.as_ref(), document_id, file_name)? {
                    provider.delete_document(&existing.document_id)?;
                }
                let created =
                    provider.create_document(document_id, &self.document_mime_type, file_name)?;
                provider.write_document(&created.document_id, content.as_bytes())
            }
            StorageNode::Scoped(path) => {
                self.ensure_accessing(path)?;
                require_directory(path)?;
                write_atomically(path, file_name, content.as_bytes())
            }
            StorageNode::Local(path) => {
                if self.create_missing_directories && !path.exists() {
                    fs::create_dir_all(path).map_err(|e| AccessError::from_io(display(path), e))?;
                }
                require_directory(path)?;
                write_atomically(path, file_name, content.as_bytes())
            }
        }
    }
}

/// Prefix of the sibling file a write goes through; fixed length so any
/// name the filesystem accepts can be written
const TEMP_PREFIX: &str = ".tmp_";

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn find_child(
    provider: &dyn DocumentProvider,
    parent_id: &str,
    name: &str,
) -> AccessResult<Option<DocumentRecord>> {
    Ok(provider
        .query_children(parent_id)?
        .into_iter()
        .find(|record| record.display_name.as_deref() == Some(name)))
}

fn record_info(record: DocumentRecord) -> NodeInfo {
    NodeInfo {
        name: record.display_name,
        is_directory: record.is_directory,
        size: Some(record.size),
        last_modified: record.last_modified,
    }
}

fn metadata_info(name: Option<String>, meta: &fs::Metadata) -> NodeInfo {
    NodeInfo {
        name,
        is_directory: meta.is_dir(),
        size: Some(meta.len()),
        last_modified: meta.modified().ok(),
    }
}

fn path_info(path: &Path) -> AccessResult<NodeInfo> {
    let meta = fs::metadata(path).map_err(|e| AccessError::from_io(display(path), e))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    Ok(metadata_info(name, &meta))
}

// Entry metadata does not follow symlinks, so link cycles cannot recurse.
fn path_children(
    path: &Path,
    wrap: fn(PathBuf) -> StorageNode,
) -> AccessResult<Vec<(StorageNode, NodeInfo)>> {
    let reader = fs::read_dir(path).map_err(|e| AccessError::from_io(display(path), e))?;
    let mut children = Vec::new();
    for item in reader {
        let item = item.map_err(|e| AccessError::from_io(display(path), e))?;
        let meta = item
            .metadata()
            .map_err(|e| AccessError::from_io(display(&item.path()), e))?;
        let name = item.file_name().into_string().ok();
        children.push((wrap(item.path()), metadata_info(name, &meta)));
    }
    Ok(children)
}

fn require_directory(path: &Path) -> AccessResult<()> {
    let meta = fs::metadata(path).map_err(|e| AccessError::from_io(display(path), e))?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(AccessError::NotFound(format!("Not a directory: {}", display(path))))
    }
}

fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> AccessResult<()> {
    let target = dir.join(file_name);
    let temp = dir.join(unique_name(TEMP_PREFIX));

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&temp, &target)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&temp);
        AccessError::from_io(display(&target), e)
    })
}
