// Run orchestration for Callsight.
// Walks each configured file, pushes every discovered call through
// resolution, filtering, description, and emission, then applies queued
// annotations back to the sources.

use crate::common::CallsightError;
use crate::domain::calls::CallCollector;
use crate::domain::describe::describe;
use crate::domain::edits::{annotation_text, EditSet};
use crate::domain::filter::Criteria;
use crate::domain::index::SymbolIndex;
use crate::domain::location::LineIndex;
use crate::domain::report::ReportRecord;
use crate::ports::{FileStore, ReportSink};
use anyhow::{Context, Result};
use log::{debug, error, warn};

/// Options for one run, built from the command line. No process-wide state.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub criteria: Criteria,
    pub show_call_ast: bool,
    pub show_callee_ast: bool,
    pub annotate: bool,
}

/// Outcome of a run, used to derive the process exit code. Zero matches is
/// still a success; skipped files and failed writes are not.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub calls_reported: usize,
    pub files_annotated: usize,
    pub write_failures: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.files_failed == 0 && self.write_failures == 0
    }
}

pub struct RunDriver<'a> {
    pub index: &'a SymbolIndex,
    pub options: RunOptions,
    pub sink: &'a mut dyn ReportSink,
    pub file_store: &'a dyn FileStore,
}

impl RunDriver<'_> {
    /// Process `(crate_name, file_path, content)` sources in order.
    ///
    /// Parse failures skip the file and continue; emit failures, edit
    /// collisions, and span/content mismatches abort the whole run.
    pub fn run(&mut self, sources: &[(String, String, String)]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut edits = EditSet::new();

        for (_, path, content) in sources {
            let ast = match syn::parse_file(content) {
                Ok(ast) => ast,
                Err(e) => {
                    warn!("failed to parse {}: {}", path, e);
                    summary.files_failed += 1;
                    continue;
                }
            };
            summary.files_processed += 1;

            let line_index = LineIndex::new(path, content);
            let collector = CallCollector::new(
                self.options.criteria.callee_name.as_deref(),
                self.options.show_call_ast,
            );

            for event in collector.collect(&ast) {
                let Some(decl) = self.index.resolve(&event.target, event.arg_count) else {
                    debug!(
                        "skipping unresolved {} call to `{}` at {}:{}",
                        event.kind,
                        event.target.simple_name(),
                        path,
                        event.start.line
                    );
                    continue;
                };

                let callee = describe(&decl);
                let site = line_index.resolve(event.start);
                if !self.options.criteria.accepts(site.line, &callee) {
                    continue;
                }

                let record = ReportRecord {
                    kind: event.kind,
                    site,
                    call_dump: event.dump,
                    callee: callee.clone(),
                    callee_dump: if self.options.show_callee_ast {
                        decl.dump.clone()
                    } else {
                        None
                    },
                };
                self.sink
                    .emit(&record)
                    .context("failed to write report output")?;
                summary.calls_reported += 1;

                if self.options.annotate {
                    let offset = line_index.byte_offset(event.end).ok_or_else(|| {
                        CallsightError::InternalConsistency(format!(
                            "call end {}:{} has no offset in {}",
                            event.end.line, event.end.column, path
                        ))
                    })?;
                    edits.queue(path, offset, annotation_text(&callee))?;
                }
            }
        }

        if self.options.annotate {
            self.apply_edits(&edits, &mut summary)?;
        }

        Ok(summary)
    }

    /// Apply queued annotations file by file. A failed read or write is fatal
    /// for that file only; the remaining files are still attempted. An edit
    /// offset that no longer fits the file's content aborts the whole run.
    fn apply_edits(
        &self,
        edits: &EditSet,
        summary: &mut RunSummary,
    ) -> Result<(), CallsightError> {
        for file in edits.files() {
            let original = match self.file_store.read(file) {
                Ok(content) => content,
                Err(e) => {
                    error!(
                        "{}",
                        CallsightError::WriteFailure {
                            path: file.to_string(),
                            detail: format!("could not re-read original: {}", e),
                        }
                    );
                    summary.write_failures += 1;
                    continue;
                }
            };
            let annotated = edits.apply_to(file, &original)?;
            match self.file_store.write(file, &annotated) {
                Ok(()) => summary.files_annotated += 1,
                Err(e) => {
                    error!(
                        "{}",
                        CallsightError::WriteFailure {
                            path: file.to_string(),
                            detail: e.to_string(),
                        }
                    );
                    summary.write_failures += 1;
                }
            }
        }
        Ok(())
    }
}
