//! Resource handles
//!
//! A handle is the serialized form of a user grant. Three storage models exist
//! side by side and each gets its own variant:
//!
//! - `content://<authority>/tree/<treeId>[/document/<docId>][/<name>...]`
//!   resolves through a document provider ([`TreeUri`])
//! - `file:///...` must be checked out through a security scope ([`ScopedUrl`])
//! - anything else is an unsandboxed filesystem path

use crate::error::{AccessError, AccessResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Scheme prefix of document-provider handles
pub const CONTENT_SCHEME: &str = "content://";

/// Scheme prefix of security-scoped handles
pub const FILE_SCHEME: &str = "file://";

const TREE_SEGMENT: &str = "tree";
const DOCUMENT_SEGMENT: &str = "document";

/// Characters left unescaped inside URI segments
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode_segment(segment: &str, raw: &str) -> AccessResult<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AccessError::InvalidHandle(format!("Undecodable segment in {}", raw)))
}

/// Which storage model a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    /// Document-provider tree URI
    Document,
    /// Security-scoped file URL
    Scoped,
    /// Plain filesystem path
    Path,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Document => write!(f, "document"),
            HandleKind::Scoped => write!(f, "scoped"),
            HandleKind::Path => write!(f, "path"),
        }
    }
}

/// A document-provider tree URI
///
/// The tree id names the granted root. An optional document id addresses a
/// document inside that tree, and trailing names address descendants by
/// display name relative to that document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeUri {
    authority: String,
    tree_id: String,
    document_id: Option<String>,
    trailing: Vec<String>,
}

impl TreeUri {
    /// Creates the URI of a granted tree root
    pub fn new(authority: impl Into<String>, tree_id: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            tree_id: tree_id.into(),
            document_id: None,
            trailing: Vec::new(),
        }
    }

    /// Parses a `content://` tree URI
    ///
    /// A `document/<id>` pair is only recognized when the decoded id carries
    /// a volume prefix (`volume:path`) and lies inside the tree. Anything
    /// else after the tree id parses as trailing names.
    pub fn parse(raw: &str) -> AccessResult<Self> {
        let rest = raw
            .strip_prefix(CONTENT_SCHEME)
            .ok_or_else(|| AccessError::InvalidHandle(format!("Not a content URI: {}", raw)))?;

        let mut segments = rest.split('/');
        let authority = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AccessError::InvalidHandle(format!("Missing authority: {}", raw)))?;

        if segments.next() != Some(TREE_SEGMENT) {
            return Err(AccessError::InvalidHandle(format!("Not a tree URI: {}", raw)));
        }

        let tree_id = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AccessError::InvalidHandle(format!("Missing tree id: {}", raw)))
            .and_then(|s| decode_segment(s, raw))?;

        let mut remaining: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();

        let mut document_id = None;
        if remaining.len() >= 2 && remaining[0] == DOCUMENT_SEGMENT {
            let candidate = decode_segment(remaining[1], raw)?;
            if candidate.contains(':') && document_in_tree(&tree_id, &candidate) {
                document_id = Some(candidate);
                remaining.drain(..2);
            }
        }

        let trailing = remaining
            .into_iter()
            .map(|s| decode_segment(s, raw))
            .collect::<AccessResult<Vec<_>>>()?;

        Ok(Self {
            authority: authority.to_string(),
            tree_id,
            document_id,
            trailing,
        })
    }

    /// Provider authority
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Id of the granted tree root
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    /// Id of the addressed document (the tree root when none is given)
    pub fn document_id(&self) -> &str {
        self.document_id.as_deref().unwrap_or(&self.tree_id)
    }

    /// Names to resolve below the addressed document
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    /// URI of another document inside the same tree
    pub fn document(&self, document_id: impl Into<String>) -> Self {
        Self {
            authority: self.authority.clone(),
            tree_id: self.tree_id.clone(),
            document_id: Some(document_id.into()),
            trailing: Vec::new(),
        }
    }

    /// URI of the tree root this URI belongs to
    pub fn tree_root(&self) -> Self {
        Self::new(self.authority.clone(), self.tree_id.clone())
    }

    /// Checks whether both URIs live under the same grant
    pub fn same_tree(&self, other: &TreeUri) -> bool {
        self.authority == other.authority && self.tree_id == other.tree_id
    }

    /// Checks whether `document_id` lies inside this URI's tree
    pub fn contains_document(&self, document_id: &str) -> bool {
        document_in_tree(&self.tree_id, document_id)
    }
}

fn document_in_tree(tree_id: &str, document_id: &str) -> bool {
    if document_id == tree_id {
        return true;
    }
    if tree_id.ends_with(':') || tree_id.ends_with('/') {
        return document_id.starts_with(tree_id);
    }
    document_id
        .strip_prefix(tree_id)
        .is_some_and(|rest| rest.starts_with('/'))
}

impl fmt::Display for TreeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}/{}",
            CONTENT_SCHEME,
            self.authority,
            TREE_SEGMENT,
            encode_segment(&self.tree_id)
        )?;
        if let Some(document_id) = &self.document_id {
            write!(f, "/{}/{}", DOCUMENT_SEGMENT, encode_segment(document_id))?;
        }
        for name in &self.trailing {
            write!(f, "/{}", encode_segment(name))?;
        }
        Ok(())
    }
}

/// A security-scoped `file://` URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedUrl {
    url: Url,
    path: PathBuf,
}

impl ScopedUrl {
    /// Parses a `file://` URL
    pub fn parse(raw: &str) -> AccessResult<Self> {
        if !raw.starts_with(FILE_SCHEME) {
            return Err(AccessError::InvalidHandle(format!("Not a file URL: {}", raw)));
        }
        let url = Url::parse(raw)
            .map_err(|e| AccessError::InvalidHandle(format!("{}: {}", raw, e)))?;
        Self::from_url(url)
    }

    /// Builds the URL of a directory (with a trailing slash)
    pub fn from_directory_path(path: impl AsRef<Path>) -> AccessResult<Self> {
        let path = path.as_ref();
        let url = Url::from_directory_path(path).map_err(|_| {
            AccessError::InvalidHandle(format!("Not an absolute path: {}", path.display()))
        })?;
        Self::from_url(url)
    }

    /// Builds the URL of a file
    pub fn from_file_path(path: impl AsRef<Path>) -> AccessResult<Self> {
        let path = path.as_ref();
        let url = Url::from_file_path(path).map_err(|_| {
            AccessError::InvalidHandle(format!("Not an absolute path: {}", path.display()))
        })?;
        Self::from_url(url)
    }

    /// Builds the URL, refusing paths that could climb out of a granted root
    ///
    /// A segment that decodes to a separator (`..%2F`) or a `.`/`..`
    /// component would let a prefix check accept a path outside the root.
    fn from_url(url: Url) -> AccessResult<Self> {
        let escapes = url.path_segments().map_or(false, |mut segments| {
            segments.any(|segment| {
                let decoded = percent_decode_str(segment).decode_utf8_lossy();
                decoded.contains('/') || decoded.contains('\\')
            })
        });
        if escapes {
            return Err(AccessError::InvalidHandle(format!(
                "Encoded separator in file URL: {}",
                url
            )));
        }

        let path = url
            .to_file_path()
            .map_err(|_| AccessError::InvalidHandle(format!("Not a local file URL: {}", url)))?;
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir))
        {
            return Err(AccessError::InvalidHandle(format!(
                "Relative component in file URL: {}",
                url
            )));
        }
        Ok(Self { url, path })
    }

    /// Filesystem location the URL points to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialized URL
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ScopedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A string-serializable reference to a user-granted directory or file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceHandle {
    /// Resolved through a document provider
    Document(TreeUri),
    /// Checked out through a security scope
    Scoped(ScopedUrl),
    /// Plain filesystem path, no checkout
    Path(PathBuf),
}

impl ResourceHandle {
    /// Parses a serialized handle
    ///
    /// The scheme selects the variant; strings without a known scheme are
    /// treated as filesystem paths.
    pub fn parse(raw: &str) -> AccessResult<Self> {
        if raw.is_empty() {
            return Err(AccessError::InvalidHandle("Empty handle".to_string()));
        }
        if raw.contains('\0') {
            return Err(AccessError::InvalidHandle(
                "Handle contains NUL byte".to_string(),
            ));
        }

        if raw.starts_with(CONTENT_SCHEME) {
            TreeUri::parse(raw).map(ResourceHandle::Document)
        } else if raw.starts_with(FILE_SCHEME) {
            ScopedUrl::parse(raw).map(ResourceHandle::Scoped)
        } else {
            Ok(ResourceHandle::Path(PathBuf::from(raw)))
        }
    }

    /// Storage model of this handle
    pub fn kind(&self) -> HandleKind {
        match self {
            ResourceHandle::Document(_) => HandleKind::Document,
            ResourceHandle::Scoped(_) => HandleKind::Scoped,
            ResourceHandle::Path(_) => HandleKind::Path,
        }
    }

    /// Externally addressable string of a descendant file
    ///
    /// This is the serialized handle, a single `/`, then the relative path.
    /// URI handles get each path segment escaped so the address parses back
    /// to the same names.
    pub fn child_address(&self, relative_path: &str) -> String {
        let base = match self {
            // A leading `document` name must not be read back as a document id
            ResourceHandle::Document(uri)
                if uri.document_id.is_none()
                    && uri.trailing.is_empty()
                    && relative_path.split('/').next() == Some(DOCUMENT_SEGMENT) =>
            {
                uri.document(uri.tree_id()).to_string()
            }
            _ => self.to_string(),
        };
        let relative = match self {
            ResourceHandle::Path(_) => relative_path.to_string(),
            ResourceHandle::Document(_) | ResourceHandle::Scoped(_) => relative_path
                .split('/')
                .map(encode_segment)
                .collect::<Vec<_>>()
                .join("/"),
        };
        format!("{}/{}", base.trim_end_matches('/'), relative)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceHandle::Document(uri) => write!(f, "{}", uri),
            ResourceHandle::Scoped(url) => write!(f, "{}", url),
            ResourceHandle::Path(path) => write!(f, "{}", path.to_string_lossy()),
        }
    }
}

impl FromStr for ResourceHandle {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceHandle {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceHandle> for String {
    fn from(handle: ResourceHandle) -> Self {
        handle.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_uri() {
        let uri = TreeUri::parse("content://docs.local/tree/primary%3ADocuments").unwrap();
        assert_eq!(uri.authority(), "docs.local");
        assert_eq!(uri.tree_id(), "primary:Documents");
        assert_eq!(uri.document_id(), "primary:Documents");
        assert!(uri.trailing().is_empty());
    }

    #[test]
    fn test_tree_uri_display_encodes_ids() {
        let uri = TreeUri::new("docs.local", "primary:My Files");
        assert_eq!(
            uri.to_string(),
            "content://docs.local/tree/primary%3AMy%20Files"
        );
        assert_eq!(TreeUri::parse(&uri.to_string()).unwrap(), uri);
    }

    #[test]
    fn test_document_uri_inside_tree() {
        let tree = TreeUri::new("docs.local", "primary:Documents");
        let child = tree.document("primary:Documents/sub");
        let raw = child.to_string();
        assert_eq!(
            raw,
            "content://docs.local/tree/primary%3ADocuments/document/primary%3ADocuments%2Fsub"
        );

        let parsed = TreeUri::parse(&raw).unwrap();
        assert_eq!(parsed.document_id(), "primary:Documents/sub");
        assert!(parsed.same_tree(&tree));
        assert_eq!(parsed.tree_root(), tree);
    }

    #[test]
    fn test_trailing_names_after_tree() {
        let uri = TreeUri::parse("content://docs.local/tree/primary%3ADocs/sub/b.txt").unwrap();
        assert_eq!(uri.document_id(), "primary:Docs");
        assert_eq!(uri.trailing(), &["sub".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_child_named_document_is_trailing() {
        let uri = TreeUri::parse("content://docs.local/tree/primary%3ADocs/document/notes.txt")
            .unwrap();
        assert_eq!(uri.document_id(), "primary:Docs");
        assert_eq!(uri.trailing(), &["document".to_string(), "notes.txt".to_string()]);
    }

    #[test]
    fn test_document_pair_outside_tree_is_trailing() {
        let uri = TreeUri::parse("content://docs.local/tree/primary%3ADocs/document/a%3Ab.txt")
            .unwrap();
        assert_eq!(uri.document_id(), "primary:Docs");
        assert_eq!(uri.trailing(), &["document".to_string(), "a:b.txt".to_string()]);
    }

    #[test]
    fn test_contains_document() {
        let tree = TreeUri::new("docs.local", "primary:Docs");
        assert!(tree.contains_document("primary:Docs"));
        assert!(tree.contains_document("primary:Docs/sub"));
        assert!(!tree.contains_document("primary:Docs2"));
        assert!(!tree.contains_document("primary:Other"));

        let volume = TreeUri::new("docs.local", "primary:");
        assert!(volume.contains_document("primary:anything"));
        assert!(!volume.contains_document("secondary:x"));
    }

    #[test]
    fn test_invalid_tree_uris() {
        assert!(matches!(
            TreeUri::parse("content://"),
            Err(AccessError::InvalidHandle(_))
        ));
        assert!(matches!(
            TreeUri::parse("content://docs.local/document/primary%3Ax"),
            Err(AccessError::InvalidHandle(_))
        ));
        assert!(matches!(
            TreeUri::parse("content://docs.local/tree/"),
            Err(AccessError::InvalidHandle(_))
        ));
        assert!(matches!(
            TreeUri::parse("content://docs.local/tree/%FF%FE"),
            Err(AccessError::InvalidHandle(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_scoped_url_from_directory() {
        let url = ScopedUrl::from_directory_path("/var/mobile/Docs").unwrap();
        assert_eq!(url.as_str(), "file:///var/mobile/Docs/");
        assert_eq!(url.path(), Path::new("/var/mobile/Docs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scoped_url_decodes_path() {
        let url = ScopedUrl::parse("file:///var/mobile/My%20Docs/").unwrap();
        assert_eq!(url.path(), Path::new("/var/mobile/My Docs"));
    }

    #[test]
    fn test_scoped_url_rejects_encoded_traversal() {
        for raw in [
            "file:///var/mobile/Docs/..%2Fsecret.txt",
            "file:///var/mobile/Docs/..%2f",
            "file:///var/mobile/Docs/a%2F..%2F..%2Fetc",
            "file:///var/mobile/Docs/..%5Csecret.txt",
        ] {
            assert!(
                matches!(ScopedUrl::parse(raw), Err(AccessError::InvalidHandle(_))),
                "accepted {}",
                raw
            );
        }
        assert!(matches!(
            ResourceHandle::parse("file:///var/mobile/Docs/..%2Fsecret.txt"),
            Err(AccessError::InvalidHandle(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_scoped_url_normalizes_literal_dots() {
        let url = ScopedUrl::parse("file:///var/mobile/Docs/../Other/").unwrap();
        assert_eq!(url.path(), Path::new("/var/mobile/Other"));
    }

    #[test]
    fn test_scoped_url_rejects_relative_path() {
        assert!(matches!(
            ScopedUrl::from_directory_path("relative/dir"),
            Err(AccessError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_handle_variant_by_scheme() {
        let doc = ResourceHandle::parse("content://docs.local/tree/primary%3A").unwrap();
        assert_eq!(doc.kind(), HandleKind::Document);

        let plain = ResourceHandle::parse("/home/user/Backups").unwrap();
        assert_eq!(plain.kind(), HandleKind::Path);
        assert_eq!(plain.to_string(), "/home/user/Backups");

        let windows = ResourceHandle::parse("C:\\Users\\me\\Backups").unwrap();
        assert_eq!(windows.kind(), HandleKind::Path);
    }

    #[cfg(unix)]
    #[test]
    fn test_scoped_handle_parse() {
        let scoped = ResourceHandle::parse("file:///private/var/Docs/").unwrap();
        assert_eq!(scoped.kind(), HandleKind::Scoped);
        assert_eq!(scoped.to_string(), "file:///private/var/Docs/");
    }

    #[test]
    fn test_empty_and_nul_handles_rejected() {
        assert!(matches!(
            ResourceHandle::parse(""),
            Err(AccessError::InvalidHandle(_))
        ));
        assert!(matches!(
            ResourceHandle::parse("/tmp/a\0b"),
            Err(AccessError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_child_address_joins_with_single_slash() {
        let plain = ResourceHandle::parse("/data/export").unwrap();
        assert_eq!(plain.child_address("sub/b.txt"), "/data/export/sub/b.txt");

        let trailing = ResourceHandle::parse("/data/export/").unwrap();
        assert_eq!(trailing.child_address("a.txt"), "/data/export/a.txt");

        let doc = ResourceHandle::parse("content://docs.local/tree/primary%3ADocs").unwrap();
        assert_eq!(
            doc.child_address("a.txt"),
            "content://docs.local/tree/primary%3ADocs/a.txt"
        );
    }

    #[test]
    fn test_document_child_address_parses_back() {
        let doc = ResourceHandle::parse("content://docs.local/tree/primary%3ADocs").unwrap();
        let address = doc.child_address("my notes/50%.txt");
        match ResourceHandle::parse(&address).unwrap() {
            ResourceHandle::Document(uri) => {
                assert_eq!(uri.document_id(), "primary:Docs");
                assert_eq!(uri.trailing(), &["my notes".to_string(), "50%.txt".to_string()]);
            }
            other => panic!("Expected document handle, got {:?}", other),
        }
    }

    #[test]
    fn test_child_under_document_directory_parses_back() {
        let doc = ResourceHandle::parse("content://docs.local/tree/primary%3ADocs").unwrap();
        for relative in ["document/a:b.txt", "document/primary:Docs/x.txt"] {
            let address = doc.child_address(relative);
            match ResourceHandle::parse(&address).unwrap() {
                ResourceHandle::Document(uri) => {
                    assert_eq!(uri.document_id(), "primary:Docs");
                    let expected: Vec<String> = relative.split('/').map(String::from).collect();
                    assert_eq!(uri.trailing(), expected.as_slice());
                }
                other => panic!("Expected document handle, got {:?}", other),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_scoped_child_address_parses_back() {
        let scoped = ResourceHandle::parse("file:///var/Docs/").unwrap();
        let address = scoped.child_address("sub/a #1.txt");
        match ResourceHandle::parse(&address).unwrap() {
            ResourceHandle::Scoped(url) => {
                assert_eq!(url.path(), Path::new("/var/Docs/sub/a #1.txt"));
            }
            other => panic!("Expected scoped handle, got {:?}", other),
        }
    }

    #[test]
    fn test_handle_serializes_as_string() {
        let handle = ResourceHandle::parse("/data/export").unwrap();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"/data/export\"");

        let back: ResourceHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);

        let bad: Result<ResourceHandle, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
