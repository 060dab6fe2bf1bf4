pub mod memory;
pub mod directory;

use crate::error::Result;

pub use memory::MemoryArchive;
pub use directory::DirectoryArchive;

/// Source of the raw blobs inside a replay archive.
///
/// The header lives in the container's user-data block and must be readable
/// before any build-specific decoder is known.
pub trait ArchiveSource {
    /// Raw user-data header blob
    fn user_data_header(&self) -> Result<Vec<u8>>;

    /// Contents of a named file, or `None` if the archive has no such file
    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

impl<T: ArchiveSource + ?Sized> ArchiveSource for Box<T> {
    fn user_data_header(&self) -> Result<Vec<u8>> {
        (**self).user_data_header()
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>> {
        (**self).read_file(name)
    }
}
