use crate::ports::FileStore;
use dashmap::DashMap;
use std::fs;

// ============================================================================
// DiskFileStore - Real filesystem access for the annotation apply phase
// ============================================================================

pub struct DiskFileStore;

impl FileStore for DiskFileStore {
    fn read(&self, path: &str) -> std::io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        fs::write(path, content)
    }
}

// ============================================================================
// MemoryFileStore - In-memory store backing tests
// ============================================================================

#[derive(Default)]
pub struct MemoryFileStore {
    files: DashMap<String, String>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, path: &str, content: &str) {
        self.files.insert(path.to_string(), content.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.get(path).map(|r| r.clone())
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &str) -> std::io::Result<String> {
        self.files.get(path).map(|r| r.clone()).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string())
        })
    }

    fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        self.files.insert(path.to_string(), content.to_string());
        Ok(())
    }
}
