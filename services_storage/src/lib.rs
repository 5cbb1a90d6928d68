//! # Storage Service
//!
//! This crate defines the three native storage models a directory handle can
//! live in, and one dispatch layer over them.
//!
//! ## Philosophy
//!
//! - **Grants are explicit**: Document trees need a persisted grant, scoped
//!   paths need an active checkout, plain paths need neither
//! - **One interface**: Callers see [`StorageNode`] and [`Storage`], never the
//!   per-platform mechanics
//! - **Whole-content I/O**: Files are read and written in one piece
//!
//! ## Design
//!
//! - **DocumentProvider**: Content-resolution indirection behind `content://` URIs
//! - **UriGrants**: Persisted tree grants
//! - **SecurityScope / BookmarkStore**: Checkout brackets for `file://` URLs
//! - **Storage**: Tagged dispatch used by traversal and file I/O
//! - **FailingDocumentProvider**: Fault injection for tests

pub mod backend;
pub mod documents;
pub mod failing;
pub mod grants;
pub mod node;
pub mod security_scope;

pub use backend::Storage;
pub use documents::{DocumentProvider, DocumentRecord, LocalDocumentProvider, MIME_TYPE_DIRECTORY};
pub use failing::{FailingDocumentProvider, FailurePolicy};
pub use grants::UriGrants;
pub use node::{is_valid_name, NodeInfo, StorageNode};
pub use security_scope::{BookmarkStore, SecurityScope};
