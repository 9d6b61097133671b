//! Tree scanning errors.

use std::path::{Path, PathBuf};

/// Error raised when a directory in the document root cannot be scanned.
///
/// Unreadable individual files never produce this error; they are kept in the
/// tree with a fallback title.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Directory could not be opened or listed.
    #[error("failed to read directory {}: {source}", path.display())]
    Io {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Directory resolves to one of its own ancestors.
    #[error("symlink loop detected at {}", .0.display())]
    SymlinkLoop(PathBuf),
}

impl ScanError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the directory that caused the failure.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::SymlinkLoop(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display_includes_path() {
        let err = ScanError::io(
            Path::new("/docs/private"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(err.path(), Path::new("/docs/private"));
        assert!(err.to_string().contains("/docs/private"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_symlink_loop_path() {
        let err = ScanError::SymlinkLoop(PathBuf::from("/docs/a/loop"));

        assert_eq!(err.path(), Path::new("/docs/a/loop"));
        assert_eq!(err.to_string(), "symlink loop detected at /docs/a/loop");
    }
}
