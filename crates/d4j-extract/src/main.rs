//! Command-line surface over the extraction and batch engine.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use d4j_extract::batch::{BatchConfig, BatchOrchestrator, BatchSpec};
use d4j_extract::dataset::Defects4j;
use d4j_extract::diff::diff_trees;
use d4j_extract::extract::{scan_tree, ScanOptions};
use d4j_extract::output::write_records;

#[derive(Parser)]
#[command(
    name = "d4j-extract",
    about = "Extract Java methods and JavaDoc from source trees and diff them across Defects4J bug versions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a single source tree and emit its method records
    Scan {
        /// Path to the source root directory
        source: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Emit JSON lines instead of a single JSON array
        #[arg(long)]
        jsonl: bool,
    },
    /// Compare buggy and fixed trees and emit the changed methods
    Diff {
        /// Path to the buggy source root
        buggy: PathBuf,
        /// Path to the fixed source root
        fixed: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Emit JSON lines instead of a single JSON array
        #[arg(long)]
        jsonl: bool,
    },
    /// Process Defects4J bugs into per-bug method-level diff artifacts
    Preprocess {
        /// Comma-separated list of Defects4J projects
        #[arg(long, default_value = "Lang,Chart,Time,Math,Mockito")]
        projects: String,
        /// Limit to this single project
        #[arg(long)]
        project_only: Option<String>,
        /// Start bug id (inclusive)
        #[arg(long)]
        start_id: Option<u32>,
        /// End bug id (inclusive)
        #[arg(long)]
        end_id: Option<u32>,
        /// Output directory for per-bug JSON artifacts
        #[arg(long, default_value = "d4j_data")]
        out: PathBuf,
        /// Scan only src/main/java subtrees when present
        #[arg(long)]
        main_only: bool,
        /// Overwrite existing artifacts
        #[arg(long)]
        force: bool,
        /// Stop dispatching new jobs after the first failure
        #[arg(long)]
        stop_on_error: bool,
        /// Parallel workers (defaults to available parallelism)
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Scan { source, out, jsonl } => run_scan(source, out, jsonl),
        Command::Diff {
            buggy,
            fixed,
            out,
            jsonl,
        } => run_diff(buggy, fixed, out, jsonl),
        Command::Preprocess {
            projects,
            project_only,
            start_id,
            end_id,
            out,
            main_only,
            force,
            stop_on_error,
            jobs,
        } => run_preprocess(
            projects,
            project_only,
            start_id,
            end_id,
            out,
            main_only,
            force,
            stop_on_error,
            jobs,
        ),
    }
}

fn run_scan(source: PathBuf, out: Option<PathBuf>, jsonl: bool) -> ExitCode {
    let records = match scan_tree(&source, &ScanOptions::default()) {
        Ok(records) => records,
        Err(e) => {
            error!(root = %source.display(), error = %e, "scan failed");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = write_records(&records, out.as_deref(), jsonl) {
        error!(error = %e, "failed to write scan output");
        return ExitCode::from(2);
    }
    info!(
        methods = records.len(),
        root = %source.display(),
        "scan complete"
    );
    ExitCode::SUCCESS
}

fn run_diff(buggy: PathBuf, fixed: PathBuf, out: Option<PathBuf>, jsonl: bool) -> ExitCode {
    let records = match diff_trees(&buggy, &fixed, &ScanOptions::default()) {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "diff failed");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = write_records(&records, out.as_deref(), jsonl) {
        error!(error = %e, "failed to write diff output");
        return ExitCode::from(2);
    }
    info!(changed_methods = records.len(), "diff complete");
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn run_preprocess(
    projects: String,
    project_only: Option<String>,
    start_id: Option<u32>,
    end_id: Option<u32>,
    out: PathBuf,
    main_only: bool,
    force: bool,
    stop_on_error: bool,
    jobs: Option<usize>,
) -> ExitCode {
    let project_list: Vec<String> = project_only
        .map(|p| vec![p])
        .unwrap_or_else(|| projects.split(',').map(|p| p.trim().to_string()).collect());

    let spec = BatchSpec {
        projects: project_list,
        start_id,
        end_id,
    };
    let config = BatchConfig {
        out_dir: out,
        main_only,
        force,
        stop_on_error,
        jobs: jobs.unwrap_or(0),
    };

    let dataset = Defects4j::default();
    let orchestrator = BatchOrchestrator::new(&dataset, config);
    let report = match orchestrator.run(&spec) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "preprocess failed before dispatch");
            return ExitCode::from(2);
        }
    };

    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "batch complete"
    );
    for failure in &report.failures {
        error!(
            project = %failure.project,
            bug_id = failure.bug_id,
            message = %failure.message,
            "job failed"
        );
    }

    // Partial failure under the skip policy is the designed outcome; only a
    // stop-on-error batch with failures is a failed invocation.
    if stop_on_error && report.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
