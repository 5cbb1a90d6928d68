//! # Filesystem View
//!
//! This crate provides a uniform directory view over every storage model.
//!
//! ## Philosophy
//!
//! - **Paths are views, not authority**: Traversal never grants access you don't have
//! - **One traversal**: Listing and metadata collection share a single
//!   depth-first walk, parameterized by what each child turns into
//! - **All or nothing**: A failure anywhere in the tree discards partial results
//!
//! ## Design
//!
//! - A traversal acquires the handle's scope once, at the top
//! - A [`TraversalRoot`] pairs a resolved node with the relative path prefix
//!   accumulated so far
//! - Children are visited in native order, never sorted

pub mod details;
pub mod path;
pub mod root;
pub mod walker;

pub use details::{millis_since_epoch, MetadataCollector};
pub use path::PathResolver;
pub use root::TraversalRoot;
pub use walker::{ChildVisit, DirectoryWalker};
