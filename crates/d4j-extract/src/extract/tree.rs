//! Whole-tree scanning over a source root directory.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{ExtractorError, ExtractorResult};
use crate::extract::methods::extract_from_source;
use crate::models::MethodRecord;

/// Immutable per-scan configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanOptions {
    /// Restrict the walk to `src/main/java` when that subdirectory exists.
    pub main_only: bool,
}

/// Resolve the directory the walk actually starts from.
pub fn effective_root(root: &Path, options: &ScanOptions) -> PathBuf {
    if options.main_only {
        let candidate = root.join("src").join("main").join("java");
        if candidate.is_dir() {
            return candidate;
        }
    }
    root.to_path_buf()
}

/// Scan every `.java` file beneath `root` and concatenate the per-file
/// method records, in sorted walk order.
///
/// A file that cannot be read or parsed is logged and skipped; the rest of
/// the tree is still scanned. A root with no source files yields an empty
/// sequence. An unreadable root is a configuration error.
pub fn scan_tree(root: &Path, options: &ScanOptions) -> ExtractorResult<Vec<MethodRecord>> {
    if !root.is_dir() {
        return Err(ExtractorError::Config(format!(
            "source root is not a readable directory: {}",
            root.display()
        )));
    }
    let walk_root = effective_root(root, options);

    let mut records = Vec::new();
    let mut files_scanned = 0usize;
    for entry in WalkDir::new(&walk_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("java")
        {
            continue;
        }
        files_scanned += 1;

        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to read source file, skipping");
                continue;
            }
        };
        match extract_from_source(&source, &path.display().to_string()) {
            Ok(methods) => records.extend(methods),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to parse source file, skipping");
            }
        }
    }

    debug!(
        root = %walk_root.display(),
        files = files_scanned,
        methods = records.len(),
        "tree scan complete"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scans_all_java_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a/First.java", "class First { void m() {} }");
        write_file(dir.path(), "b/Second.java", "class Second { void n() {} }");
        write_file(dir.path(), "notes.txt", "not java");

        let records = scan_tree(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        let classes: Vec<&str> = records.iter().map(|r| r.class_qualifier.as_str()).collect();
        assert_eq!(classes, vec!["First", "Second"]);
    }

    #[test]
    fn empty_tree_yields_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let records = scan_tree(dir.path(), &ScanOptions::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_root_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan_tree(&missing, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractorError::Config(_)));
    }

    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "Good.java", "class Good { void m() {} }");
        // Invalid UTF-8 makes read_to_string fail for this file only.
        fs::write(dir.path().join("Bad.java"), [0xff, 0xfe, 0xfd]).unwrap();

        let records = scan_tree(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_qualifier, "Good");
    }

    #[test]
    fn main_only_prefers_conventional_subtree() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "src/main/java/App.java",
            "class App { void m() {} }",
        );
        write_file(
            dir.path(),
            "src/test/java/AppTest.java",
            "class AppTest { void t() {} }",
        );

        let opts = ScanOptions { main_only: true };
        let records = scan_tree(dir.path(), &opts).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_qualifier, "App");
    }

    #[test]
    fn main_only_falls_back_to_root_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "App.java", "class App { void m() {} }");

        let opts = ScanOptions { main_only: true };
        let records = scan_tree(dir.path(), &opts).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "x/A.java", "class A { int m(int x) { return x; } }");
        write_file(dir.path(), "y/B.java", "class B { /** d */ void n() {} }");

        let first = scan_tree(dir.path(), &ScanOptions::default()).unwrap();
        let second = scan_tree(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
