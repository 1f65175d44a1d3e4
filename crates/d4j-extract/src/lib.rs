//! Method-level extraction and diffing of Java source trees.
//!
//! This crate scans Java source trees with tree-sitter, producing one
//! [`models::MethodRecord`] per method or constructor declaration, and
//! computes signature-keyed diffs between a buggy and a fixed version of the
//! same codebase. A batch orchestrator drives the pipeline across many
//! Defects4J bug instances in parallel, containing per-job failures so one
//! broken checkout never aborts the batch.

pub mod batch;
pub mod dataset;
pub mod diff;
pub mod errors;
pub mod extract;
pub mod models;
pub mod output;

pub use errors::{ExtractorError, ExtractorResult};
pub use models::{DiffRecord, DiffStatus, MethodRecord, SignatureKey};
