// Infrastructure implementations for Callsight.

pub mod file_store;
pub mod project_loader;

pub use file_store::{DiskFileStore, MemoryFileStore};
pub use project_loader::ProjectLoader;
