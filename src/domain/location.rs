// Source location resolution for Callsight.
// Maps proc-macro2 span positions back to coordinates in the original file text.

use proc_macro2::LineColumn;
use serde::Serialize;

/// A resolved source position, 1-based line and column, as a human reading
/// the file would count them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePos {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// Per-file index of line-start byte offsets.
///
/// `proc_macro2` spans (with the `span-locations` feature) report positions as
/// 1-based lines and 0-based character columns. Reports want 1-based columns;
/// edits want byte offsets into the original content. Both conversions are pure
/// lookups against the content this index was built from, so the index must be
/// built from the exact string that was parsed.
pub struct LineIndex {
    file: String,
    content_len: usize,
    line_starts: Vec<usize>,
    lines: Vec<String>,
}

impl LineIndex {
    pub fn new(file: &str, content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        let lines = content.split('\n').map(|l| l.to_string()).collect();
        Self {
            file: file.to_string(),
            content_len: content.len(),
            line_starts,
            lines,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Resolve a span position to a report coordinate.
    pub fn resolve(&self, pos: LineColumn) -> SourcePos {
        SourcePos {
            file: self.file.clone(),
            line: pos.line,
            column: pos.column + 1,
        }
    }

    /// Byte offset of a span position in the original content.
    ///
    /// The column is counted in characters, so multi-byte characters earlier on
    /// the line must be walked, not added. Returns `None` when the position does
    /// not exist in the indexed content, which indicates the caller resolved a
    /// span against the wrong file.
    pub fn byte_offset(&self, pos: LineColumn) -> Option<usize> {
        let line_start = *self.line_starts.get(pos.line.checked_sub(1)?)?;
        let line = self.lines.get(pos.line - 1)?;
        let in_line: usize = line
            .char_indices()
            .nth(pos.column)
            .map(|(i, _)| i)
            .or_else(|| {
                // A position one past the last character is a valid end-of-token
                // offset on the final token of a line.
                if line.chars().count() == pos.column {
                    Some(line.len())
                } else {
                    None
                }
            })?;
        let offset = line_start + in_line;
        if offset <= self.content_len {
            Some(offset)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lc(line: usize, column: usize) -> LineColumn {
        LineColumn { line, column }
    }

    #[test]
    fn resolves_one_based_columns() {
        let idx = LineIndex::new("lib.rs", "fn main() {}\n");
        let pos = idx.resolve(lc(1, 3));
        assert_eq!(pos.file, "lib.rs");
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn byte_offsets_cross_lines() {
        let src = "fn a() {}\nfn b() {}\n";
        let idx = LineIndex::new("lib.rs", src);
        assert_eq!(idx.byte_offset(lc(1, 0)), Some(0));
        assert_eq!(idx.byte_offset(lc(2, 0)), Some(10));
        assert_eq!(idx.byte_offset(lc(2, 3)), Some(13));
        assert_eq!(&src[13..14], "b");
    }

    #[test]
    fn byte_offsets_count_chars_not_bytes() {
        // 'é' is two bytes; column 4 points at the 'x'.
        let src = "// é\nlet x = 1;\n";
        let idx = LineIndex::new("lib.rs", src);
        let off = idx.byte_offset(lc(2, 4)).unwrap();
        assert_eq!(&src[off..off + 1], "x");
    }

    #[test]
    fn end_of_line_offset_is_valid() {
        let src = "foo();\n";
        let idx = LineIndex::new("lib.rs", src);
        // One past the ')' token, before the ';'.
        assert_eq!(idx.byte_offset(lc(1, 5)), Some(5));
        // One past the end of the line content.
        assert_eq!(idx.byte_offset(lc(1, 6)), Some(6));
    }

    #[test]
    fn out_of_range_position_is_none() {
        let idx = LineIndex::new("lib.rs", "fn a() {}\n");
        assert_eq!(idx.byte_offset(lc(5, 0)), None);
        assert_eq!(idx.byte_offset(lc(1, 40)), None);
    }
}
