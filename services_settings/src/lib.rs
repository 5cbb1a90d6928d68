//! # Picker Settings
//!
//! Typed configuration for the directory-access services.
//!
//! ## Philosophy
//!
//! - **Typed settings**: Every knob is a struct field, not a string lookup
//! - **Deterministic**: Settings serialize to stable, versioned JSON
//! - **Forgiving**: Missing fields take their defaults, corrupt files fall back
//!   to defaults instead of failing start-up
//!
//! ## Example
//!
//! ```ignore
//! use services_settings::PickerSettings;
//!
//! let settings = PickerSettings::default()
//!     .with_volume("primary", "/srv/storage")
//!     .with_create_missing_directories(false);
//! ```

pub mod persistence;

use core_types::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use persistence::{
    deserialize_settings, load_settings_file, load_settings_safe, save_settings_file,
    serialize_settings, PersistenceError, PersistenceResult,
};

/// Placeholder for entries whose name cannot be decoded
pub const DEFAULT_UNKNOWN_NAME: &str = "unknown";

/// Prefix of writability probe files
pub const DEFAULT_PROBE_PREFIX: &str = ".write_test_";

/// MIME type used when creating documents through a provider
pub const DEFAULT_DOCUMENT_MIME_TYPE: &str = "text/plain";

/// Authority of the local document provider
pub const DEFAULT_DOCUMENT_AUTHORITY: &str = "dirpicker.documents";

/// Configuration for every directory-access service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    /// Format version (for future migrations)
    pub version: u32,
    /// Storage model the host emulates
    pub platform: Platform,
    /// Version string reported next to the platform name
    pub platform_version: String,
    /// Name reported for entries without a decodable name
    pub unknown_name: String,
    /// Prefix of the probe file used to test writability
    pub probe_prefix: String,
    /// MIME type of documents created through a provider
    pub document_mime_type: String,
    /// Whether plain path handles create missing directories on write
    pub create_missing_directories: bool,
    /// Authority of the local document provider
    pub document_authority: String,
    /// Volume id to local root, served by the document provider
    pub document_volumes: BTreeMap<String, PathBuf>,
    /// JSON file holding persisted URI grants
    pub grant_store: Option<PathBuf>,
    /// JSON file holding security-scoped bookmarks
    pub bookmark_store: Option<PathBuf>,
}

impl PickerSettings {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates settings for a platform with all other fields defaulted
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    /// Registers a document volume
    pub fn with_volume(mut self, volume: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.document_volumes.insert(volume.into(), root.into());
        self
    }

    /// Sets whether missing directories are created on write
    pub fn with_create_missing_directories(mut self, create: bool) -> Self {
        self.create_missing_directories = create;
        self
    }

    /// Sets the platform version string
    pub fn with_platform_version(mut self, version: impl Into<String>) -> Self {
        self.platform_version = version.into();
        self
    }

    /// Text returned by `getPlatformVersion`
    pub fn platform_description(&self) -> String {
        if self.platform_version.is_empty() {
            self.platform.display_name().to_string()
        } else {
            format!("{} {}", self.platform.display_name(), self.platform_version)
        }
    }
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            platform: Platform::current(),
            platform_version: String::new(),
            unknown_name: DEFAULT_UNKNOWN_NAME.to_string(),
            probe_prefix: DEFAULT_PROBE_PREFIX.to_string(),
            document_mime_type: DEFAULT_DOCUMENT_MIME_TYPE.to_string(),
            create_missing_directories: true,
            document_authority: DEFAULT_DOCUMENT_AUTHORITY.to_string(),
            document_volumes: BTreeMap::new(),
            grant_store: None,
            bookmark_store: None,
        }
    }
}
