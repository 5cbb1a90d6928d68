//! # Core Types
//!
//! This crate defines the fundamental types shared by every directory-access crate.
//!
//! ## Philosophy
//!
//! Core types are designed with these principles:
//! - **Handles, not ambient paths**: Every operation names the grant it acts under.
//! - **One representation per storage model**: Tagged variants, never subclasses.
//! - **Explicit failure taxonomy**: Lower layers return typed errors; only the
//!   service boundary flattens them.
//!
//! ## Key Types
//!
//! - [`ResourceHandle`]: A string-serializable reference to a granted directory or file
//! - [`TreeUri`]: A document-provider tree URI
//! - [`ScopedUrl`]: A security-scoped `file://` URL
//! - [`Entry`]: One record produced by directory traversal
//! - [`AccessError`]: Failure taxonomy for every access operation
//! - [`Platform`]: Which native storage model a host runs under

pub mod entry;
pub mod error;
pub mod handle;
pub mod ids;
pub mod platform;
pub mod uuid_tools;

pub use entry::Entry;
pub use error::{AccessError, AccessResult};
pub use handle::{HandleKind, ResourceHandle, ScopedUrl, TreeUri, CONTENT_SCHEME, FILE_SCHEME};
pub use ids::RequestCode;
pub use platform::Platform;
pub use uuid_tools::{new_uuid, unique_name};
