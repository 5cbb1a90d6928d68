//! # Host Runtime
//!
//! The request loop that ties the channel to the plugin.

use crate::plugin::DirectoryPickerPlugin;
use core_types::AccessError;
use ipc::{decode_call, encode_reply, CodecError, ErrorCode, MethodError, MethodReply, MethodResponse};
use services_file_picker::{ChooserOutcome, ScriptedChooser};
use services_logger::{LogEntry, LogLevel};
use services_settings::{load_settings_file, PersistenceError, PickerSettings};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Setup failed: {0}")]
    Setup(#[from] AccessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Codec(#[from] CodecError),
}

/// Loads the settings file at `path`
///
/// A file that cannot be read is an error. Contents that do not parse, or
/// carry an unsupported version, are logged and replaced by the defaults.
pub fn load_settings(path: &Path) -> Result<PickerSettings, HostRuntimeError> {
    match load_settings_file(path) {
        Ok(settings) => Ok(settings),
        Err(PersistenceError::Io(error)) => Err(HostRuntimeError::Io(error)),
        Err(error) => {
            LogEntry::new(LogLevel::Warn, error.to_string())
                .with_operation("load_settings")
                .with_field("path", path.display())
                .emit();
            Ok(PickerSettings::default())
        }
    }
}

/// Host runtime configuration
#[derive(Debug, Clone, Default)]
pub struct HostRuntimeConfig {
    /// Settings the services are built from
    pub settings: PickerSettings,
    /// Locations the chooser answers with, in order; cancels once exhausted
    pub choices: Vec<String>,
    /// Maximum requests to serve (0 = unlimited)
    pub max_requests: usize,
}

/// Host runtime
pub struct HostRuntime {
    config: HostRuntimeConfig,
    plugin: DirectoryPickerPlugin,
    requests: usize,
}

impl HostRuntime {
    /// Creates a new host runtime
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let chooser = ScriptedChooser::new(
            config
                .choices
                .iter()
                .map(|location| ChooserOutcome::Chosen(location.clone())),
        );
        let plugin = DirectoryPickerPlugin::from_settings(&config.settings, Arc::new(chooser))?;

        Ok(Self {
            config,
            plugin,
            requests: 0,
        })
    }

    /// Serves requests from `input` until end of input
    ///
    /// Returns when:
    /// - Input is exhausted
    /// - Max requests reached (if configured)
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<(), HostRuntimeError> {
        LogEntry::new(LogLevel::Info, "serving method channel")
            .with_field("channel", ipc::CHANNEL_NAME)
            .with_field("platform", self.config.settings.platform)
            .emit();

        for line in input.lines() {
            if self.config.max_requests > 0 && self.requests >= self.config.max_requests {
                break;
            }

            let Some(reply) = self.step(&line?) else {
                continue;
            };
            writeln!(output, "{}", encode_reply(&reply)?)?;
            output.flush()?;
        }

        Ok(())
    }

    /// Answers one input line; blank lines produce no reply
    pub fn step(&mut self, line: &str) -> Option<MethodReply> {
        match decode_call(line) {
            Ok(call) => {
                self.requests += 1;
                Some(MethodReply::new(call.id, self.plugin.handle(&call)))
            }
            Err(CodecError::Empty) => None,
            Err(error) => {
                self.requests += 1;
                LogEntry::new(LogLevel::Warn, error.to_string())
                    .with_field("error", "invalid_request")
                    .emit();
                Some(MethodReply::new(
                    None,
                    MethodResponse::Error(MethodError::new(
                        ErrorCode::InvalidRequest,
                        error.to_string(),
                    )),
                ))
            }
        }
    }

    pub fn plugin(&self) -> &DirectoryPickerPlugin {
        &self.plugin
    }

    /// Number of requests answered so far
    pub fn request_count(&self) -> usize {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Platform;

    fn runtime() -> HostRuntime {
        HostRuntime::new(HostRuntimeConfig {
            settings: PickerSettings::for_platform(Platform::Linux),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut runtime = runtime();
        assert!(runtime.step("   ").is_none());
        assert_eq!(runtime.request_count(), 0);
    }

    #[test]
    fn test_malformed_line_gets_error_reply() {
        let mut runtime = runtime();
        let reply = runtime.step("{oops").unwrap();
        assert_eq!(reply.id, None);
        match reply.response {
            MethodResponse::Error(error) => assert_eq!(error.code, ErrorCode::InvalidRequest),
            other => panic!("Expected error, got {:?}", other),
        }
        assert_eq!(runtime.request_count(), 1);
    }

    #[test]
    fn test_reply_echoes_id() {
        let mut runtime = runtime();
        let reply = runtime
            .step(r#"{"id":42,"method":"getPlatformVersion"}"#)
            .unwrap();
        assert_eq!(reply.id, Some(42));
        assert_eq!(reply.response, MethodResponse::Success("Linux".into()));
    }

    #[test]
    fn test_run_writes_one_line_per_request() {
        let mut runtime = runtime();
        let input = "{\"id\":1,\"method\":\"getPlatformVersion\"}\n\n{\"id\":2,\"method\":\"nope\"}\n";
        let mut output = Vec::new();
        runtime.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            ipc::decode_reply(lines[1]).unwrap().response,
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn test_load_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = PickerSettings::for_platform(Platform::Macos).with_platform_version("14.4");
        services_settings::save_settings_file(&path, &settings).unwrap();

        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_settings_falls_back_on_bad_contents() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(load_settings(&corrupt).unwrap(), PickerSettings::default());

        let future = dir.path().join("future.json");
        std::fs::write(&future, r#"{ "version": 999 }"#).unwrap();
        assert_eq!(load_settings(&future).unwrap(), PickerSettings::default());
    }

    #[test]
    fn test_load_settings_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_settings(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(HostRuntimeError::Io(_))));
    }

    #[test]
    fn test_max_requests() {
        let mut runtime = HostRuntime::new(HostRuntimeConfig {
            settings: PickerSettings::for_platform(Platform::Linux),
            max_requests: 1,
            ..Default::default()
        })
        .unwrap();
        let input = "{\"method\":\"getPlatformVersion\"}\n{\"method\":\"getPlatformVersion\"}\n";
        let mut output = Vec::new();
        runtime.run(input.as_bytes(), &mut output).unwrap();
        assert_eq!(runtime.request_count(), 1);
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }
}
