//! Exit codes for the aat-core CLI.
//!
//! Exit codes communicate run outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-6: Success/operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use aat_common::{Error, ErrorCategory};

/// Exit codes for aat-core operations.
///
/// These codes are a stable contract for automation. Changes require
/// a major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success: every sweep partition classified
    Clean = 0,

    /// Partial success: some partitions failed and are listed in the report
    Partial = 3,

    /// Invalid arguments (frequency, probabilities, missing paths)
    ArgsError = 10,

    /// Configuration invalid
    ConfigError = 11,

    /// Dataset invalid (schema, duplicates, empty after filtering)
    DatasetError = 12,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success (codes 0-6).
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    /// Map an engine error to its exit code.
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Dataset => ExitCode::DatasetError,
            ErrorCategory::Classification | ErrorCategory::Analysis => ExitCode::ArgsError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::Partial.as_i32(), 3);
        assert_eq!(ExitCode::ConfigError.as_i32(), 11);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::Partial.is_success());
        assert!(!ExitCode::ArgsError.is_success());
        assert!(!ExitCode::IoError.is_success());
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::Config("bad".into())),
            ExitCode::ConfigError
        );
        assert_eq!(ExitCode::from_error(&Error::EmptyDataset), ExitCode::DatasetError);
        assert_eq!(
            ExitCode::from_error(&Error::InvalidFrequency { frequency: 0.0 }),
            ExitCode::ArgsError
        );
    }
}
