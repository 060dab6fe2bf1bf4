use std::collections::HashMap;

use super::ArchiveSource;
use crate::error::Result;

/// In-memory archive, filled file by file
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    header: Vec<u8>,
    files: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new(header: impl Into<Vec<u8>>) -> Self {
        Self {
            header: header.into(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), data.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }
}

impl ArchiveSource for MemoryArchive {
    fn user_data_header(&self) -> Result<Vec<u8>> {
        Ok(self.header.clone())
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).cloned())
    }
}
