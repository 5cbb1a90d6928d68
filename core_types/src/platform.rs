//! Host platform flavours

use crate::handle::HandleKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which native storage model a host runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Macos,
    Linux,
    Windows,
}

impl Platform {
    /// Platform the binary was compiled for
    ///
    /// Targets without a dedicated storage model fall back to `Linux`.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Macos => "macOS",
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        }
    }

    /// Kind of handle the selection flow produces on this platform
    pub fn handle_kind(&self) -> HandleKind {
        match self {
            Platform::Android => HandleKind::Document,
            Platform::Ios => HandleKind::Scoped,
            Platform::Macos | Platform::Linux | Platform::Windows => HandleKind::Path,
        }
    }

    /// Parses the lowercase identifier used in configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "android" => Some(Platform::Android),
            "ios" => Some(Platform::Ios),
            "macos" => Some(Platform::Macos),
            "linux" => Some(Platform::Linux),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
