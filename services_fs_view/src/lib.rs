//! # Directory Access Service
//!
//! This service exposes permission checks, traversal and whole-file I/O over
//! user-granted directory handles.
//!
//! ## Philosophy
//!
//! - Every operation names the handle it acts under, as a string
//! - Every operation acquires the handle's scope once and releases it on all
//!   exit paths
//! - Service never escalates authority
//! - Errors stay typed inside; only the boundary methods flatten them to
//!   `false` or `None`
//!
//! ## Operations
//!
//! - `has_permission(dir)` / `request_permission(dir)`: Read+write check
//! - `write_file(dir, name, content)`: Replace a file's whole content
//! - `read_file(file)`: Whole file content as text
//! - `list_directory(dir, recursive)`: Relative paths of children
//! - `directory_details(dir, recursive)`: Full entry records

pub mod operations;
pub mod service;

pub use operations::DirectoryOperations;
pub use service::DirectoryAccessService;
