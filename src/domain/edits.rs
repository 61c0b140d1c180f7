// Edit accumulation for Callsight's annotation mode.
// Zero-width insertions addressed by byte offset in the ORIGINAL file
// content, queued during traversal and applied in one pass at end of run.

use crate::common::CallsightError;
use crate::domain::describe::CalleeDescription;
use std::collections::BTreeMap;

/// Build the inline annotation for one resolved callee.
/// Inserted immediately after the call expression's last token, before
/// whatever character originally followed it; nothing is deleted.
pub fn annotation_text(callee: &CalleeDescription) -> String {
    if callee.defaulted {
        format!(" /* (defaulted) {} */", callee.signature)
    } else {
        format!(" /* {} {} */", callee.qualified_name, callee.signature)
    }
}

/// All queued insertions for a run, grouped by file and keyed by offset.
///
/// Offsets are byte positions in the unmodified content, so they stay valid
/// for the whole apply pass; sorting falls out of the map ordering. Two
/// distinct call expressions can never end at the same offset, so a collision
/// means the traversal broke an assumption and the run must abort rather than
/// corrupt the file.
#[derive(Debug, Default)]
pub struct EditSet {
    files: BTreeMap<String, BTreeMap<usize, String>>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of queued insertions across all files.
    pub fn len(&self) -> usize {
        self.files.values().map(|edits| edits.len()).sum()
    }

    /// Queue one insertion. Fails with a named internal-consistency error if
    /// an insertion is already queued at the same offset of the same file.
    pub fn queue(
        &mut self,
        file: &str,
        offset: usize,
        text: String,
    ) -> Result<(), CallsightError> {
        let edits = self.files.entry(file.to_string()).or_default();
        if edits.contains_key(&offset) {
            return Err(CallsightError::edit_collision(file, offset));
        }
        edits.insert(offset, text);
        Ok(())
    }

    /// Files that have queued edits, in deterministic order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Produce the annotated content for one file: copy original bytes up to
    /// each offset, splice in the edit text, continue. Single linear pass.
    ///
    /// Offsets were computed against the content parsed at the start of the
    /// run; an offset past the end of `original` means the content no longer
    /// matches, and splicing anyway would corrupt the file. That is an
    /// internal-consistency violation, not a recoverable condition.
    pub fn apply_to(&self, file: &str, original: &str) -> Result<String, CallsightError> {
        let Some(edits) = self.files.get(file) else {
            return Ok(original.to_string());
        };
        let extra: usize = edits.values().map(String::len).sum();
        let mut out = String::with_capacity(original.len() + extra);
        let mut copied = 0;
        for (&offset, text) in edits {
            if offset > original.len() {
                return Err(CallsightError::InternalConsistency(format!(
                    "edit offset {} is past the end of {} ({} bytes)",
                    offset,
                    file,
                    original.len()
                )));
            }
            out.push_str(&original[copied..offset]);
            out.push_str(text);
            copied = offset;
        }
        out.push_str(&original[copied..]);
        Ok(out)
    }
}
