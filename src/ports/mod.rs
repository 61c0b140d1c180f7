use crate::domain::report::ReportRecord;

/// Sink for per-call report records. Implementations own the output stream;
/// an unwritable stream is fatal to the run.
pub trait ReportSink {
    fn emit(&mut self, record: &ReportRecord) -> std::io::Result<()>;
}

/// Raw file access used by the annotation apply phase.
pub trait FileStore {
    fn read(&self, path: &str) -> std::io::Result<String>;
    fn write(&self, path: &str, content: &str) -> std::io::Result<()>;
}
