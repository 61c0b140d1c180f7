// Report emission for Callsight.
// One structured block of text (or one JSON line) per matching call.

use crate::domain::calls::CallKind;
use crate::domain::describe::CalleeDescription;
use crate::domain::location::SourcePos;
use crate::ports::ReportSink;
use serde::Serialize;
use std::io::Write;

/// Everything the emitter needs for one matching call. Produced once per
/// match, consumed immediately, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub kind: CallKind,
    pub site: SourcePos,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_dump: Option<String>,
    pub callee: CalleeDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_dump: Option<String>,
}

/// The callee line shared by the text report and the inline annotation:
/// `<qualified> with prototype "<sig>"` plus provenance.
fn callee_line(callee: &CalleeDescription) -> String {
    let mut line = format!(
        "{} with prototype \"{}\"",
        callee.qualified_name, callee.signature
    );
    match &callee.site {
        Some((file, decl_line)) => {
            line.push_str(&format!(" declared at {}:{}", file, decl_line));
        }
        None => line.push_str(" (defaulted)"),
    }
    line
}

const SEPARATOR: &str =
    "----------------------------------------------------------------";

/// Fixed-structure text reporter, writing to the diagnostic stream.
pub struct TextReportSink<W: Write> {
    out: W,
}

impl<W: Write> TextReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportSink for TextReportSink<W> {
    fn emit(&mut self, record: &ReportRecord) -> std::io::Result<()> {
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(
            self.out,
            "{} call (File:{} Line:{} Col:{})",
            record.kind, record.site.file, record.site.line, record.site.column
        )?;
        if let Some(dump) = &record.call_dump {
            writeln!(self.out, "{}", dump)?;
        }
        writeln!(self.out, "{}", callee_line(&record.callee))?;
        if let Some(dump) = &record.callee_dump {
            writeln!(self.out, "{}", dump)?;
        }
        writeln!(self.out)
    }
}

/// One serialized record per line, for downstream tooling.
pub struct JsonReportSink<W: Write> {
    out: W,
}

impl<W: Write> JsonReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn emit(&mut self, record: &ReportRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.out, "{}", line)
    }
}
