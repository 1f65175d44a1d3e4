//! Contract with the external bug-dataset checkout tool.
//!
//! The engine only depends on the [`BugDataset`] trait; [`Defects4j`] is the
//! production implementation shelling out to the `defects4j` executable.
//! Tests substitute a stub that materializes source trees directly.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::errors::{ExtractorError, ExtractorResult};

/// Which side of a bug instance to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BugVersion {
    Buggy,
    Fixed,
}

impl BugVersion {
    /// Revision suffix understood by the dataset tool (`1b` / `1f`).
    pub fn suffix(self) -> char {
        match self {
            BugVersion::Buggy => 'b',
            BugVersion::Fixed => 'f',
        }
    }
}

/// External checkout collaborator: lists known bug ids per project and
/// materializes one version of one bug instance on disk.
pub trait BugDataset: Sync {
    /// All active bug ids for `project`, ascending.
    fn active_bug_ids(&self, project: &str) -> ExtractorResult<Vec<u32>>;

    /// Materialize the requested version of `(project, bug_id)` at `dest`.
    fn checkout(
        &self,
        project: &str,
        bug_id: u32,
        version: BugVersion,
        dest: &Path,
    ) -> ExtractorResult<()>;
}

/// The Defects4J command-line tool.
#[derive(Clone, Debug)]
pub struct Defects4j {
    program: String,
}

impl Default for Defects4j {
    fn default() -> Self {
        Self {
            program: "defects4j".to_string(),
        }
    }
}

impl Defects4j {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> ExtractorResult<(bool, String, String)> {
        debug!(program = %self.program, ?args, "invoking dataset tool");
        let output = Command::new(&self.program).args(args).output()?;
        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

impl BugDataset for Defects4j {
    fn active_bug_ids(&self, project: &str) -> ExtractorResult<Vec<u32>> {
        let (ok, stdout, stderr) = self.run(&["query", "-p", project, "-q", "bug.id"])?;
        if !ok {
            return Err(ExtractorError::Dataset(format!(
                "bug id query failed for {project}: {}",
                stderr.trim()
            )));
        }
        let mut ids: Vec<u32> = stdout
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    fn checkout(
        &self,
        project: &str,
        bug_id: u32,
        version: BugVersion,
        dest: &Path,
    ) -> ExtractorResult<()> {
        let revision = format!("{bug_id}{}", version.suffix());
        let dest_str = dest.display().to_string();
        let (ok, _stdout, stderr) = self.run(&[
            "checkout", "-p", project, "-v", &revision, "-w", &dest_str,
        ])?;
        if !ok {
            return Err(ExtractorError::Checkout(format!(
                "{project}-{revision}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_suffixes_match_the_tool_convention() {
        assert_eq!(BugVersion::Buggy.suffix(), 'b');
        assert_eq!(BugVersion::Fixed.suffix(), 'f');
    }

    #[test]
    fn missing_executable_surfaces_as_an_error() {
        let tool = Defects4j::new("definitely-not-a-real-tool-xyz");
        assert!(tool.active_bug_ids("Lang").is_err());
    }
}
