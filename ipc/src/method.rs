//! Method names and argument keys

use std::fmt;

/// Name of the channel the plugin answers on
pub const CHANNEL_NAME: &str = "directory_picker";

/// Argument map keys
pub mod keys {
    pub const DIRECTORY_PATH: &str = "directoryPath";
    pub const FILE_NAME: &str = "fileName";
    pub const CONTENT: &str = "content";
    pub const RECURSIVE: &str = "recursive";
    pub const FILE_PATH: &str = "filePath";
}

/// Every method the channel understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetPlatformVersion,
    SelectDirectory,
    HasPermission,
    RequestPermission,
    WriteFile,
    ListDirectory,
    ReadFile,
    GetDirectoryDetails,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::GetPlatformVersion,
        Method::SelectDirectory,
        Method::HasPermission,
        Method::RequestPermission,
        Method::WriteFile,
        Method::ListDirectory,
        Method::ReadFile,
        Method::GetDirectoryDetails,
    ];

    /// Name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Method::GetPlatformVersion => "getPlatformVersion",
            Method::SelectDirectory => "selectDirectory",
            Method::HasPermission => "hasPermission",
            Method::RequestPermission => "requestPermission",
            Method::WriteFile => "writeFile",
            Method::ListDirectory => "listDirectory",
            Method::ReadFile => "readFile",
            Method::GetDirectoryDetails => "getDirectoryDetails",
        }
    }

    /// Looks up a method by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }

    /// Argument keys the method reads
    pub fn argument_keys(&self) -> &'static [&'static str] {
        match self {
            Method::GetPlatformVersion | Method::SelectDirectory => &[],
            Method::HasPermission | Method::RequestPermission => &[keys::DIRECTORY_PATH],
            Method::WriteFile => &[keys::DIRECTORY_PATH, keys::FILE_NAME, keys::CONTENT],
            Method::ListDirectory | Method::GetDirectoryDetails => {
                &[keys::DIRECTORY_PATH, keys::RECURSIVE]
            }
            Method::ReadFile => &[keys::FILE_PATH],
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Method::from_name("deleteDirectory"), None);
        assert_eq!(Method::from_name("ListDirectory"), None);
    }

    #[test]
    fn test_argument_keys() {
        assert_eq!(
            Method::WriteFile.argument_keys(),
            &["directoryPath", "fileName", "content"]
        );
        assert_eq!(Method::ReadFile.argument_keys(), &["filePath"]);
        assert!(Method::SelectDirectory.argument_keys().is_empty());
    }
}
