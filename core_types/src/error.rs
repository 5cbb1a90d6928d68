//! Failure taxonomy for directory access

use std::io;
use thiserror::Error;

/// Result alias used by every access operation
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors that can occur while acquiring, probing, traversing or reading a handle
#[derive(Debug, Error)]
pub enum AccessError {
    /// Malformed or unparsable identifier
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Scope checkout failed or the target is not writable
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Target entry is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Native read/write/enumerate error
    #[error("I/O failure: {context}")]
    IoFailure {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The directory chooser was dismissed
    #[error("Selection cancelled by user")]
    UserCancelled,
}

impl AccessError {
    /// Classifies an I/O error raised while operating on `context`
    ///
    /// `NotFound` and `PermissionDenied` kinds map onto the matching variants,
    /// everything else is kept as an `IoFailure` with its source.
    pub fn from_io(context: impl Into<String>, source: io::Error) -> Self {
        let context = context.into();
        match source.kind() {
            io::ErrorKind::NotFound => AccessError::NotFound(context),
            io::ErrorKind::PermissionDenied => AccessError::PermissionDenied(context),
            _ => AccessError::IoFailure { context, source },
        }
    }

    /// Builds an `IoFailure` that did not originate from the OS
    pub fn io_failure(context: impl Into<String>, message: impl Into<String>) -> Self {
        AccessError::IoFailure {
            context: context.into(),
            source: io::Error::new(io::ErrorKind::Other, message.into()),
        }
    }

    /// Builds an `IoFailure` for bytes that are not valid UTF-8
    pub fn invalid_text(context: impl Into<String>) -> Self {
        AccessError::IoFailure {
            context: context.into(),
            source: io::Error::new(io::ErrorKind::InvalidData, "content is not valid UTF-8"),
        }
    }

    /// Short, stable name of the variant (used in structured logs)
    pub fn kind_name(&self) -> &'static str {
        match self {
            AccessError::InvalidHandle(_) => "invalid_handle",
            AccessError::PermissionDenied(_) => "permission_denied",
            AccessError::NotFound(_) => "not_found",
            AccessError::IoFailure { .. } => "io_failure",
            AccessError::UserCancelled => "user_cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_is_classified() {
        let err = AccessError::from_io("a.txt", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, AccessError::NotFound(ref p) if p == "a.txt"));
    }

    #[test]
    fn test_io_permission_is_classified() {
        let err = AccessError::from_io("dir", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, AccessError::PermissionDenied(_)));
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let err = AccessError::from_io("dir", io::Error::new(io::ErrorKind::Other, "disk gone"));
        match err {
            AccessError::IoFailure { context, source } => {
                assert_eq!(context, "dir");
                assert_eq!(source.to_string(), "disk gone");
            }
            other => panic!("Expected IoFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(AccessError::UserCancelled.kind_name(), "user_cancelled");
        assert_eq!(AccessError::invalid_text("x").kind_name(), "io_failure");
        assert_eq!(
            AccessError::InvalidHandle(String::new()).kind_name(),
            "invalid_handle"
        );
    }
}
