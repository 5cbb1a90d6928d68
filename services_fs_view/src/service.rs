//! Directory Access Service implementation

use crate::operations::DirectoryOperations;
use core_types::{AccessResult, Entry, ResourceHandle};
use fs_view::{DirectoryWalker, MetadataCollector};
use services_logger::{LogEntry, LogLevel};
use services_settings::{PickerSettings, DEFAULT_UNKNOWN_NAME};
use services_storage::Storage;
use workspace_access::{PermissionOracle, ScopeGuard};

/// The Directory Access Service
pub struct DirectoryAccessService {
    storage: Storage,
    unknown_name: String,
}

impl DirectoryAccessService {
    /// Creates a service over an existing storage
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            unknown_name: DEFAULT_UNKNOWN_NAME.to_string(),
        }
    }

    /// Builds the storage described by the settings and serves it
    pub fn from_settings(settings: &PickerSettings) -> AccessResult<Self> {
        Ok(Self::new(Storage::from_settings(settings)?).with_unknown_name(&settings.unknown_name))
    }

    /// Sets the name reported for entries without a decodable name
    pub fn with_unknown_name(mut self, name: impl Into<String>) -> Self {
        self.unknown_name = name.into();
        self
    }

    /// Storage the service operates on
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Whether `directory` grants read+write access
    pub fn has_permission(&self, directory: &str) -> bool {
        flatten("hasPermission", self.check_permission(directory)).is_some()
    }

    /// Same as `has_permission`; never prompts again
    pub fn request_permission(&self, directory: &str) -> bool {
        flatten("requestPermission", self.check_permission(directory)).is_some()
    }

    /// Writes a file; false on any failure
    pub fn write_file(&self, directory: &str, file_name: &str, content: &str) -> bool {
        let written = flatten(
            "writeFile",
            self.try_write_file(directory, file_name, content),
        );
        if written.is_some() {
            LogEntry::new(LogLevel::Debug, "file written")
                .with_operation("writeFile")
                .with_field("file", file_name)
                .with_field("bytes", content.len())
                .emit();
        }
        written.is_some()
    }

    /// Reads a file; `None` on any failure
    pub fn read_file(&self, file: &str) -> Option<String> {
        flatten("readFile", self.try_read_file(file))
    }

    /// Lists a directory; `None` on any failure
    pub fn list_directory(&self, directory: &str, recursive: bool) -> Option<Vec<String>> {
        flatten("listDirectory", self.try_list_directory(directory, recursive))
    }

    /// Collects entry records; `None` on any failure
    pub fn directory_details(&self, directory: &str, recursive: bool) -> Option<Vec<Entry>> {
        flatten(
            "getDirectoryDetails",
            self.try_directory_details(directory, recursive),
        )
    }
}

fn flatten<T>(operation: &str, result: AccessResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            LogEntry::failure(operation, &error).emit();
            None
        }
    }
}

impl DirectoryOperations for DirectoryAccessService {
    fn check_permission(&self, directory: &str) -> AccessResult<()> {
        let handle = ResourceHandle::parse(directory)?;
        PermissionOracle::new(&self.storage).check(&handle)
    }

    fn try_write_file(
        &self,
        directory: &str,
        file_name: &str,
        content: &str,
    ) -> AccessResult<()> {
        let handle = ResourceHandle::parse(directory)?;
        let guard = ScopeGuard::acquire(&self.storage, &handle);
        guard.require()?;

        let node = self.storage.resolve(&handle)?;
        self.storage.write_file(&node, file_name, content)
    }

    fn try_read_file(&self, file: &str) -> AccessResult<String> {
        let handle = ResourceHandle::parse(file)?;
        let guard = ScopeGuard::acquire(&self.storage, &handle);
        guard.require()?;

        let node = self.storage.resolve(&handle)?;
        self.storage.read_text(&node)
    }

    fn try_list_directory(&self, directory: &str, recursive: bool) -> AccessResult<Vec<String>> {
        let handle = ResourceHandle::parse(directory)?;
        DirectoryWalker::new(&self.storage)
            .with_unknown_name(self.unknown_name.clone())
            .list(&handle, recursive)
    }

    fn try_directory_details(
        &self,
        directory: &str,
        recursive: bool,
    ) -> AccessResult<Vec<Entry>> {
        let handle = ResourceHandle::parse(directory)?;
        MetadataCollector::new(&self.storage)
            .with_unknown_name(self.unknown_name.clone())
            .details(&handle, recursive)
    }
}
