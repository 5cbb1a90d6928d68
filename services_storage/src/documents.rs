//! # Document Provider
//!
//! Content-resolution indirection for `content://` tree URIs.
//!
//! Documents are addressed by opaque ids, never by filesystem paths. A
//! provider answers metadata queries, lists children, and moves whole
//! contents in and out of a document.

use crate::node::is_valid_name;
use core_types::{AccessError, AccessResult};
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

/// MIME type that creates a directory document
pub const MIME_TYPE_DIRECTORY: &str = "vnd.android.document/directory";

/// Bytes escaped when a non-UTF-8 name is written into a document id
const ID_ESCAPES: &AsciiSet = &CONTROLS.add(b'%');

/// Metadata row returned by a provider query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Opaque document id
    pub document_id: String,
    /// Display name, absent when it cannot be decoded
    pub display_name: Option<String>,
    /// Whether the document is a directory
    pub is_directory: bool,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub last_modified: Option<SystemTime>,
}

/// Access to documents behind a content authority
pub trait DocumentProvider: Send + Sync {
    /// Authority this provider serves
    fn authority(&self) -> &str;

    /// Metadata of a single document
    fn query(&self, document_id: &str) -> AccessResult<DocumentRecord>;

    /// Children of a directory document, in provider order
    fn query_children(&self, document_id: &str) -> AccessResult<Vec<DocumentRecord>>;

    /// Creates a document below `parent_id`
    fn create_document(
        &self,
        parent_id: &str,
        mime_type: &str,
        display_name: &str,
    ) -> AccessResult<DocumentRecord>;

    /// Deletes a document (recursively for directories)
    fn delete_document(&self, document_id: &str) -> AccessResult<()>;

    /// Whole content of a document
    fn read_document(&self, document_id: &str) -> AccessResult<Vec<u8>>;

    /// Replaces the whole content of an existing document
    fn write_document(&self, document_id: &str, bytes: &[u8]) -> AccessResult<()>;

    /// Whether the document accepts writes
    fn is_writable(&self, document_id: &str) -> AccessResult<bool>;
}

/// Provider serving document ids of the form `<volume>:<relative path>`
/// from local directories
pub struct LocalDocumentProvider {
    authority: String,
    volumes: BTreeMap<String, PathBuf>,
}

impl LocalDocumentProvider {
    /// Creates a provider without volumes
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            volumes: BTreeMap::new(),
        }
    }

    /// Creates a provider serving the given volumes
    pub fn with_volumes(authority: impl Into<String>, volumes: BTreeMap<String, PathBuf>) -> Self {
        Self {
            authority: authority.into(),
            volumes,
        }
    }

    /// Adds a volume
    pub fn with_volume(mut self, volume: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.volumes.insert(volume.into(), root.into());
        self
    }

    /// Local path backing a document id
    ///
    /// Segments are percent-decoded, so names that are not valid UTF-8 (or
    /// contain `%`) resolve back to the entry they were listed from.
    pub fn resolve(&self, document_id: &str) -> AccessResult<PathBuf> {
        let (volume, relative) = document_id.split_once(':').ok_or_else(|| {
            AccessError::InvalidHandle(format!("Malformed document id: {}", document_id))
        })?;
        let root = self
            .volumes
            .get(volume)
            .ok_or_else(|| AccessError::NotFound(format!("Unknown volume: {}", volume)))?;

        let mut path = root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            let bytes: Vec<u8> = percent_decode_str(segment).collect();
            let name = if is_valid_name(&String::from_utf8_lossy(&bytes)) {
                name_from_bytes(bytes)
            } else {
                None
            };
            let name = name.ok_or_else(|| {
                AccessError::InvalidHandle(format!(
                    "Illegal segment in document id: {}",
                    document_id
                ))
            })?;
            path.push(name);
        }
        Ok(path)
    }

    fn child_id(parent_id: &str, name: &OsStr) -> String {
        let segment = id_segment(name);
        if parent_id.ends_with(':') || parent_id.ends_with('/') {
            format!("{}{}", parent_id, segment)
        } else {
            format!("{}/{}", parent_id, segment)
        }
    }

    fn record(document_id: String, display_name: Option<String>, meta: &fs::Metadata) -> DocumentRecord {
        DocumentRecord {
            document_id,
            display_name,
            is_directory: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            last_modified: meta.modified().ok(),
        }
    }
}

/// Id segment of a file name; `%` is always escaped so decoding is exact
fn id_segment(name: &OsStr) -> String {
    match name.to_str() {
        Some(name) => name.replace('%', "%25"),
        None => percent_encode(name.as_encoded_bytes(), ID_ESCAPES).to_string(),
    }
}

fn name_from_bytes(bytes: Vec<u8>) -> Option<OsString> {
    match String::from_utf8(bytes) {
        Ok(name) => Some(OsString::from(name)),
        Err(e) => raw_name(e.into_bytes()),
    }
}

#[cfg(unix)]
fn raw_name(bytes: Vec<u8>) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Some(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn raw_name(_bytes: Vec<u8>) -> Option<OsString> {
    None
}

impl DocumentProvider for LocalDocumentProvider {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn query(&self, document_id: &str) -> AccessResult<DocumentRecord> {
        let path = self.resolve(document_id)?;
        let meta = fs::metadata(&path).map_err(|e| AccessError::from_io(document_id, e))?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        Ok(Self::record(document_id.to_string(), display_name, &meta))
    }

    fn query_children(&self, document_id: &str) -> AccessResult<Vec<DocumentRecord>> {
        let path = self.resolve(document_id)?;
        let reader = fs::read_dir(&path).map_err(|e| AccessError::from_io(document_id, e))?;

        let mut children = Vec::new();
        for item in reader {
            let item = item.map_err(|e| AccessError::from_io(document_id, e))?;
            let meta = item
                .metadata()
                .map_err(|e| AccessError::from_io(document_id, e))?;
            let raw_name = item.file_name();
            let display_name = raw_name.to_str().map(str::to_string);
            let child_id = Self::child_id(document_id, &raw_name);
            children.push(Self::record(child_id, display_name, &meta));
        }
        Ok(children)
    }

    fn create_document(
        &self,
        parent_id: &str,
        mime_type: &str,
        display_name: &str,
    ) -> AccessResult<DocumentRecord> {
        if !is_valid_name(display_name) {
            return Err(AccessError::InvalidHandle(format!(
                "Illegal document name: {}",
                display_name
            )));
        }
        let parent = self.resolve(parent_id)?;
        if !parent.is_dir() {
            return Err(AccessError::NotFound(parent_id.to_string()));
        }

        let child_id = Self::child_id(parent_id, OsStr::new(display_name));
        let path = parent.join(display_name);
        if mime_type == MIME_TYPE_DIRECTORY {
            fs::create_dir(&path).map_err(|e| AccessError::from_io(child_id.clone(), e))?;
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| AccessError::from_io(child_id.clone(), e))?;
        }
        self.query(&child_id)
    }

    fn delete_document(&self, document_id: &str) -> AccessResult<()> {
        let path = self.resolve(document_id)?;
        let meta = fs::symlink_metadata(&path).map_err(|e| AccessError::from_io(document_id, e))?;
        let result = if meta.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| AccessError::from_io(document_id, e))
    }

    fn read_document(&self, document_id: &str) -> AccessResult<Vec<u8>> {
        let path = self.resolve(document_id)?;
        fs::read(&path).map_err(|e| AccessError::from_io(document_id, e))
    }

    fn write_document(&self, document_id: &str, bytes: &[u8]) -> AccessResult<()> {
        let path = self.resolve(document_id)?;
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| AccessError::from_io(document_id, e))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| AccessError::from_io(document_id, e))
    }

    fn is_writable(&self, document_id: &str) -> AccessResult<bool> {
        let path = self.resolve(document_id)?;
        let meta = fs::metadata(&path).map_err(|e| AccessError::from_io(document_id, e))?;
        Ok(!meta.permissions().readonly())
    }
}
