//! Batch orchestration: expanding a batch specification into bug jobs and
//! executing them on a bounded worker pool with per-job failure containment.
//!
//! Jobs are strictly independent: each writes its own uniquely-keyed artifact
//! and shares nothing mutable with its peers, so execution needs no locking
//! beyond rayon's own result collection.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::dataset::{BugDataset, BugVersion};
use crate::diff::diff_trees;
use crate::errors::{ExtractorError, ExtractorResult};
use crate::extract::tree::ScanOptions;
use crate::output::write_artifact;

/// Immutable batch configuration, threaded explicitly through job execution.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Directory receiving one `{project}_{bug_id}.json` artifact per job.
    pub out_dir: PathBuf,
    /// Restrict scans to `src/main/java` subtrees when present.
    pub main_only: bool,
    /// Re-run jobs whose artifact already exists.
    pub force: bool,
    /// Halt dispatch of new jobs after the first failure.
    pub stop_on_error: bool,
    /// Worker pool size; 0 means the host's available parallelism.
    pub jobs: usize,
}

impl BatchConfig {
    fn workers(&self) -> usize {
        if self.jobs == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.jobs
        }
    }
}

/// What to process: a list of projects, optionally narrowed to an inclusive
/// bug id range.
#[derive(Clone, Debug)]
pub struct BatchSpec {
    pub projects: Vec<String>,
    pub start_id: Option<u32>,
    pub end_id: Option<u32>,
}

impl BatchSpec {
    fn has_explicit_range(&self) -> bool {
        self.start_id.is_some() || self.end_id.is_some()
    }
}

/// One unit of work: a `(project, bug_id)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BugJob {
    pub project: String,
    pub bug_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum JobOutcome {
    Completed { records: usize },
    Skipped,
    Failed { message: String },
}

/// A failed job, identified for the batch summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobFailure {
    pub project: String,
    pub bug_id: u32,
    pub message: String,
}

/// Terminal batch state: counts plus the failure list in submission order.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<JobFailure>,
}

/// Drives bug jobs against a [`BugDataset`] with a bounded worker pool.
pub struct BatchOrchestrator<'a, D: BugDataset> {
    dataset: &'a D,
    config: BatchConfig,
}

impl<'a, D: BugDataset> BatchOrchestrator<'a, D> {
    pub fn new(dataset: &'a D, config: BatchConfig) -> Self {
        Self { dataset, config }
    }

    /// Expand the spec, run all jobs, and summarize. Only expansion-time
    /// problems (empty project list, invalid range, unusable output
    /// directory, failed id listing) abort the run; everything later is
    /// contained per job.
    pub fn run(&self, spec: &BatchSpec) -> ExtractorResult<BatchReport> {
        let jobs = self.expand(spec)?;
        info!(
            total = jobs.len(),
            workers = self.config.workers(),
            "batch expanded, dispatching"
        );
        let outcomes = self.execute(&jobs);
        Ok(summarize(&jobs, &outcomes))
    }

    fn expand(&self, spec: &BatchSpec) -> ExtractorResult<Vec<BugJob>> {
        let projects: Vec<&str> = spec
            .projects
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if projects.is_empty() {
            return Err(ExtractorError::Config("empty project list".to_string()));
        }
        if let (Some(lo), Some(hi)) = (spec.start_id, spec.end_id) {
            if lo > hi {
                return Err(ExtractorError::Config(format!(
                    "invalid bug id range: {lo}..{hi}"
                )));
            }
        }
        std::fs::create_dir_all(&self.config.out_dir).map_err(|e| {
            ExtractorError::Config(format!(
                "cannot create output directory {}: {e}",
                self.config.out_dir.display()
            ))
        })?;

        let mut jobs = Vec::new();
        for project in projects {
            for bug_id in self.expand_project(project, spec)? {
                jobs.push(BugJob {
                    project: project.to_string(),
                    bug_id,
                });
            }
        }
        Ok(jobs)
    }

    fn expand_project(&self, project: &str, spec: &BatchSpec) -> ExtractorResult<Vec<u32>> {
        let mut ids = match self.dataset.active_bug_ids(project) {
            Ok(ids) => ids,
            Err(e) if spec.has_explicit_range() => {
                warn!(project, error = %e, "bug id listing failed, using requested range");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        // With an explicit range the range itself is a workable fallback;
        // ids the dataset no longer knows fail at checkout, per job.
        if ids.is_empty() && spec.has_explicit_range() {
            let lo = spec.start_id.unwrap_or(1);
            let hi = spec.end_id.unwrap_or(lo);
            ids = (lo..=hi).collect();
        }

        let lo = spec.start_id.unwrap_or(u32::MIN);
        let hi = spec.end_id.unwrap_or(u32::MAX);
        ids.retain(|id| (lo..=hi).contains(id));
        debug!(project, count = ids.len(), "expanded bug ids");
        Ok(ids)
    }

    fn execute(&self, jobs: &[BugJob]) -> Vec<JobOutcome> {
        let workers = self.config.workers();
        // stop-on-error needs ordered dispatch to halt deterministically, and
        // a single worker gains nothing from a pool.
        if self.config.stop_on_error || workers <= 1 {
            return self.execute_sequential(jobs);
        }
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| jobs.par_iter().map(|job| self.run_job(job)).collect()),
            Err(e) => {
                warn!(error = %e, "worker pool construction failed, running sequentially");
                self.execute_sequential(jobs)
            }
        }
    }

    fn execute_sequential(&self, jobs: &[BugJob]) -> Vec<JobOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        let mut halted = false;
        for job in jobs {
            if halted {
                outcomes.push(JobOutcome::Skipped);
                continue;
            }
            let outcome = self.run_job(job);
            if self.config.stop_on_error && matches!(outcome, JobOutcome::Failed { .. }) {
                warn!(
                    project = %job.project,
                    bug_id = job.bug_id,
                    "halting dispatch after failure"
                );
                halted = true;
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    fn run_job(&self, job: &BugJob) -> JobOutcome {
        let out_path = self
            .config
            .out_dir
            .join(format!("{}_{}.json", job.project, job.bug_id));
        if out_path.exists() && !self.config.force {
            debug!(project = %job.project, bug_id = job.bug_id, "artifact exists, skipping");
            return JobOutcome::Skipped;
        }

        match self.try_job(job, &out_path) {
            Ok(records) => {
                info!(
                    project = %job.project,
                    bug_id = job.bug_id,
                    changed_methods = records,
                    "wrote diff artifact"
                );
                JobOutcome::Completed { records }
            }
            Err(ExtractorError::Checkout(msg)) if msg.to_lowercase().contains("deprecated") => {
                debug!(project = %job.project, bug_id = job.bug_id, "deprecated bug, skipping");
                JobOutcome::Skipped
            }
            Err(e) => {
                error!(project = %job.project, bug_id = job.bug_id, error = %e, "job failed");
                JobOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn try_job(&self, job: &BugJob, out_path: &std::path::Path) -> ExtractorResult<usize> {
        let workdir = tempfile::Builder::new()
            .prefix(&format!("d4j_{}_{}_", job.project, job.bug_id))
            .tempdir()?;
        let buggy = workdir.path().join("buggy");
        let fixed = workdir.path().join("fixed");

        self.dataset
            .checkout(&job.project, job.bug_id, BugVersion::Buggy, &buggy)?;
        self.dataset
            .checkout(&job.project, job.bug_id, BugVersion::Fixed, &fixed)?;

        let options = ScanOptions {
            main_only: self.config.main_only,
        };
        let records = diff_trees(&buggy, &fixed, &options)?;
        write_artifact(out_path, &records)?;
        Ok(records.len())
    }
}

fn summarize(jobs: &[BugJob], outcomes: &[JobOutcome]) -> BatchReport {
    let mut report = BatchReport {
        total: jobs.len(),
        ..BatchReport::default()
    };
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            JobOutcome::Completed { .. } => report.succeeded += 1,
            JobOutcome::Skipped => report.skipped += 1,
            JobOutcome::Failed { message } => {
                report.failed += 1;
                report.failures.push(JobFailure {
                    project: job.project.clone(),
                    bug_id: job.bug_id,
                    message: message.clone(),
                });
            }
        }
    }
    report
}
