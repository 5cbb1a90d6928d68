//! # Directory Picker Plugin
//!
//! Dispatches method calls onto the access and selection services.

use core_types::AccessResult;
use ipc::{keys, Method, MethodCall, MethodResponse};
use services_file_picker::{DirectoryChooser, DirectorySelector};
use services_fs_view::DirectoryAccessService;
use services_logger::{LogEntry, LogLevel};
use services_settings::PickerSettings;
use std::sync::Arc;

/// Method channel dispatcher
pub struct DirectoryPickerPlugin {
    service: DirectoryAccessService,
    selector: DirectorySelector,
    platform_description: String,
}

impl DirectoryPickerPlugin {
    pub fn new(
        service: DirectoryAccessService,
        selector: DirectorySelector,
        platform_description: impl Into<String>,
    ) -> Self {
        Self {
            service,
            selector,
            platform_description: platform_description.into(),
        }
    }

    /// Builds the services described by the settings around `chooser`
    pub fn from_settings(
        settings: &PickerSettings,
        chooser: Arc<dyn DirectoryChooser>,
    ) -> AccessResult<Self> {
        Ok(Self::new(
            DirectoryAccessService::from_settings(settings)?,
            DirectorySelector::new(chooser, settings.platform),
            settings.platform_description(),
        ))
    }

    pub fn service(&self) -> &DirectoryAccessService {
        &self.service
    }

    pub fn selector(&self) -> &DirectorySelector {
        &self.selector
    }

    /// Answers one call
    ///
    /// Missing or mistyped arguments give the method's absent result.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        let Some(method) = Method::from_name(&call.method) else {
            LogEntry::new(LogLevel::Debug, "method not implemented")
                .with_field("method", &call.method)
                .emit();
            return MethodResponse::NotImplemented;
        };

        let args = &call.arguments;
        let directory = args.string(keys::DIRECTORY_PATH);

        match method {
            Method::GetPlatformVersion => {
                MethodResponse::Success(self.platform_description.clone().into())
            }
            Method::SelectDirectory => self.select_directory(),
            Method::HasPermission => MethodResponse::from_bool(
                directory.is_some_and(|dir| self.service.has_permission(dir)),
            ),
            Method::RequestPermission => MethodResponse::from_bool(
                directory.is_some_and(|dir| self.service.request_permission(dir)),
            ),
            Method::WriteFile => {
                let written = match (
                    directory,
                    args.string(keys::FILE_NAME),
                    args.string(keys::CONTENT),
                ) {
                    (Some(dir), Some(name), Some(content)) => {
                        self.service.write_file(dir, name, content)
                    }
                    _ => false,
                };
                MethodResponse::from_bool(written)
            }
            Method::ListDirectory => MethodResponse::from_option(directory.and_then(|dir| {
                self.service
                    .list_directory(dir, args.flag(keys::RECURSIVE))
            })),
            Method::ReadFile => MethodResponse::from_option(
                args.string(keys::FILE_PATH)
                    .and_then(|file| self.service.read_file(file)),
            ),
            Method::GetDirectoryDetails => {
                MethodResponse::from_option(directory.and_then(|dir| {
                    self.service
                        .directory_details(dir, args.flag(keys::RECURSIVE))
                }))
            }
        }
    }

    fn select_directory(&self) -> MethodResponse {
        match self.selector.select(self.service.storage()) {
            Ok(handle) => MethodResponse::from_option(handle.map(|h| h.to_string())),
            Err(error) => {
                LogEntry::new(LogLevel::Warn, error.to_string())
                    .with_operation(Method::SelectDirectory.name())
                    .emit();
                MethodResponse::absent()
            }
        }
    }
}
