//! # Logger Service
//!
//! This crate implements structured logging.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Entries are built as values and only rendered when emitted through the
//! `log` facade, so the host decides where they go.

use core_types::AccessError;
use std::fmt;

/// Target used for every record emitted by this workspace
pub const LOG_TARGET: &str = "dirpicker";

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl LogLevel {
    /// Matching level of the `log` facade
    pub fn as_log_level(&self) -> log::Level {
        match self {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Operation the entry belongs to (if known)
    pub operation: Option<String>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            operation: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Entry describing an error swallowed at a service boundary
    pub fn failure(operation: &str, error: &AccessError) -> Self {
        let level = match error {
            AccessError::UserCancelled => LogLevel::Debug,
            _ => LogLevel::Warn,
        };
        Self::new(level, error.to_string())
            .with_operation(operation)
            .with_field("error", error.kind_name())
    }

    /// Sets the operation
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Looks up a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the entry as a single line
    pub fn render(&self) -> String {
        let mut line = String::new();
        if let Some(operation) = &self.operation {
            line.push('[');
            line.push_str(operation);
            line.push_str("] ");
        }
        line.push_str(&self.message);
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Sends the entry to the installed logger
    pub fn emit(&self) {
        log::log!(target: LOG_TARGET, self.level.as_log_level(), "{}", self.render());
    }
}
