//! # Directory Picker Host
//!
//! This crate serves the directory picker method channel.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: Services never print; the host reads requests and
//!   writes replies
//! - **One dispatcher**: Every method name maps to exactly one service call
//! - **Nothing escapes**: Access failures leave the plugin as `null` or
//!   `false`; only malformed requests produce channel errors
//!
//! ## Responsibilities
//!
//! The host:
//! - Builds storage, grants and bookmarks from settings
//! - Decodes one call per input line and answers with one reply per line
//! - Drives the selection flow through a configured chooser
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Render a chooser UI of its own
//! - Keep any state beyond what storage persists

pub mod plugin;
pub mod runtime;

pub use plugin::DirectoryPickerPlugin;
pub use runtime::{load_settings, HostRuntime, HostRuntimeConfig, HostRuntimeError};
