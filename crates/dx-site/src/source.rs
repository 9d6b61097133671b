//! Raw document access.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// Reads raw document text by path relative to the document root.
pub trait DocumentSource: Send + Sync {
    /// Raw text of the document.
    fn read_raw(&self, relative_path: &str) -> io::Result<String>;

    /// Modification time in nanoseconds since the Unix epoch, if available.
    fn modified(&self, relative_path: &str) -> Option<u64>;
}

/// Documents on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path.trim_start_matches('/'))
    }
}

impl DocumentSource for FsDocumentSource {
    fn read_raw(&self, relative_path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(relative_path))
    }

    fn modified(&self, relative_path: &str) -> Option<u64> {
        let modified = fs::metadata(self.resolve(relative_path))
            .and_then(|m| m.modified())
            .ok()?;
        let nanos = modified.duration_since(UNIX_EPOCH).ok()?.as_nanos();
        u64::try_from(nanos).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_read_raw() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("guide")).unwrap();
        fs::write(temp_dir.path().join("guide/setup.md"), "# Setup").unwrap();
        let source = FsDocumentSource::new(temp_dir.path());

        assert_eq!(source.read_raw("guide/setup.md").unwrap(), "# Setup");
        assert_eq!(source.read_raw("/guide/setup.md").unwrap(), "# Setup");
    }

    #[test]
    fn test_read_missing() {
        let temp_dir = TempDir::new().unwrap();
        let source = FsDocumentSource::new(temp_dir.path());

        let err = source.read_raw("missing.md").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(source.modified("missing.md"), None);
    }

    #[test]
    fn test_modified_tracks_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page.md");
        fs::write(&path, "text").unwrap();
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(stamp)
            .unwrap();
        let source = FsDocumentSource::new(temp_dir.path());

        assert_eq!(source.modified("page.md"), Some(1_700_000_000_000_000_000));
    }
}
