//! Error types for duplicate scans.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a duplicate scan.
///
/// Only [`ScanError::NoRoots`], [`ScanError::Canceled`] and unexpected
/// stage failures reach the caller of a scan. The per-file variants are
/// produced inside the pipeline and cause that one file to be dropped.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The request named no usable root folder.
    #[error("No folders selected.")]
    NoRoots,

    /// The scan was canceled through its [`crate::ScanState`].
    #[error("Scan canceled")]
    Canceled,

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path exists but is not a regular file.
    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// File size changed between two stages of the same scan.
    #[error("Size of {path} changed from {expected} to {actual} bytes")]
    SizeChanged {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A background worker failed (panicked or was aborted).
    #[error("Worker task failed: {message}")]
    Task { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this is the cancellation signal rather than a real failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Whether this error ends the whole scan instead of dropping one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Task { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));

        let err = ScanError::io("/test/path", std::io::Error::other("disk"));
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_cancellation_is_distinguished() {
        assert!(ScanError::Canceled.is_canceled());
        assert!(!ScanError::NoRoots.is_canceled());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(ScanError::Canceled.is_fatal());
        assert!(
            ScanError::Task {
                message: "panicked".into()
            }
            .is_fatal()
        );
        assert!(!ScanError::NotFound { path: "/x".into() }.is_fatal());
        assert!(
            !ScanError::SizeChanged {
                path: "/x".into(),
                expected: 1,
                actual: 2
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_no_roots_message() {
        assert_eq!(ScanError::NoRoots.to_string(), "No folders selected.");
    }
}
