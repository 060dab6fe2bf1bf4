use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::ArchiveSource;
use crate::error::Result;

/// File holding the user-data header in an extracted archive
pub const HEADER_FILE: &str = "replay.header";

/// Archive already extracted to a directory, one file per archive member
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArchiveSource for DirectoryArchive {
    fn user_data_header(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.root.join(HEADER_FILE))?)
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.root.join(name)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_directory_archive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(HEADER_FILE), b"header").unwrap();
        std::fs::write(dir.path().join("replay.details"), b"details").unwrap();

        let archive = DirectoryArchive::new(dir.path());
        assert_eq!(archive.user_data_header().unwrap(), b"header");
        assert_eq!(archive.read_file("replay.details").unwrap().unwrap(), b"details");
        assert!(archive.read_file("replay.game.events").unwrap().is_none());
    }

    #[test]
    fn test_missing_header_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DirectoryArchive::new(dir.path());
        assert!(matches!(archive.user_data_header(), Err(Error::Io(_))));
    }
}
