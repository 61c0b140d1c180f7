use std::path::PathBuf;
use thiserror::Error;

/// Fatal error kinds for a Callsight run.
///
/// Per-file parse failures are not represented here: they are logged,
/// the file is skipped, and the run continues. Everything below either
/// aborts the run before any file is processed or aborts it mid-flight
/// because an internal invariant was violated.
#[derive(Debug, Error)]
pub enum CallsightError {
    /// No Cargo manifest could be located at the given build path.
    #[error("no build configuration found at {path}: {detail}")]
    ConfigurationNotFound { path: PathBuf, detail: String },

    /// A requested source file does not match any entry in the build
    /// configuration.
    #[error("source file {path} not found in build configuration")]
    SourceFileNotFound { path: String },

    /// A logic/assumption violation, e.g. two distinct call expressions
    /// producing an insertion at the same byte offset of the same file.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// The file store could not persist an annotated file.
    #[error("failed to write annotated file {path}: {detail}")]
    WriteFailure { path: String, detail: String },
}

impl CallsightError {
    /// Named constructor for the edit-collision case so call sites read
    /// like the invariant they guard.
    pub fn edit_collision(file: &str, offset: usize) -> Self {
        CallsightError::InternalConsistency(format!(
            "two edits collide at byte offset {} of {}",
            offset, file
        ))
    }
}
