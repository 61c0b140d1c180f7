// Command-line entry point for Callsight.

use anyhow::{bail, Result};
use callsight::application::{RunDriver, RunOptions, RunSummary};
use callsight::domain::filter::Criteria;
use callsight::domain::index::SymbolIndex;
use callsight::domain::report::{JsonReportSink, TextReportSink};
use callsight::infrastructure::{DiskFileStore, ProjectLoader};
use callsight::ports::ReportSink;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Build path: a package/workspace directory or a Cargo.toml path
    build_path: String,

    /// Source files to inspect; all configured files when omitted
    sources: Vec<String>,

    /// Only display call(s) at this line (0 = no filter)
    #[arg(long, default_value_t = 0)]
    call_at_line: usize,

    /// Only display call(s) to this callee ("" = no filter)
    #[arg(long, default_value = "")]
    callee_name: String,

    /// Display the AST at the call location
    #[arg(long)]
    show_call_ast: bool,

    /// Display the callee declaration AST
    #[arg(long)]
    show_callee_ast: bool,

    /// Annotate the source code with resolved-callee comments
    #[arg(long)]
    annotate: bool,

    /// Report format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let all_sources = ProjectLoader::load_build_path(&cli.build_path)?;
    let selected = ProjectLoader::select_requested(&all_sources, &cli.sources)?;

    // The index covers the whole configuration so calls in the selected files
    // can resolve to declarations anywhere in the project.
    let index = SymbolIndex::build(&all_sources, cli.show_callee_ast);

    let options = RunOptions {
        criteria: Criteria::from_cli(cli.call_at_line, &cli.callee_name),
        show_call_ast: cli.show_call_ast,
        show_callee_ast: cli.show_callee_ast,
        annotate: cli.annotate,
    };

    let stderr = std::io::stderr().lock();
    let mut sink: Box<dyn ReportSink> = match cli.format.as_str() {
        "text" => Box::new(TextReportSink::new(stderr)),
        "json" => Box::new(JsonReportSink::new(stderr)),
        other => bail!("unknown report format: {}", other),
    };

    let mut driver = RunDriver {
        index: &index,
        options,
        sink: sink.as_mut(),
        file_store: &DiskFileStore,
    };
    driver.run(&selected)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            if cli.annotate {
                println!(
                    "Annotated {} file(s), {} call(s) reported",
                    summary.files_annotated, summary.calls_reported
                );
            }
            if !summary.succeeded() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Error: {:?}", e);
            std::process::exit(1);
        }
    }
}
