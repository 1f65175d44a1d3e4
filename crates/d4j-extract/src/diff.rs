//! Signature-keyed diffing of two scanned source trees.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::debug;

use crate::errors::ExtractorResult;
use crate::extract::tree::{effective_root, scan_tree, ScanOptions};
use crate::models::{DiffRecord, DiffStatus, MethodRecord, SignatureKey};

/// Whitespace-insensitive code comparison text. Comments are kept so that
/// comment-only edits still count as modifications.
fn normalized_code(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Path of `record` relative to the scanned root, `/`-separated.
fn rel_path(root: &Path, record: &MethodRecord) -> String {
    Path::new(&record.file_path)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| record.file_path.replace('\\', "/"))
}

/// Scan one tree into a signature-keyed map. Insertion runs in declaration
/// order, so for duplicate keys (same-arity overloads) the last occurrence
/// wins; only one record per key participates in the diff.
fn scan_keyed(
    root: &Path,
    options: &ScanOptions,
) -> ExtractorResult<BTreeMap<SignatureKey, MethodRecord>> {
    let walk_root = effective_root(root, options);
    let mut map = BTreeMap::new();
    for record in scan_tree(root, options)? {
        let rel = rel_path(&walk_root, &record);
        map.insert(SignatureKey::new(&rel, &record), record);
    }
    Ok(map)
}

/// Compare the buggy and fixed trees method-by-method.
///
/// Emits one record per signature that was modified, added, or removed, in
/// key order. Methods present on both sides with identical code and javadoc
/// are suppressed entirely.
pub fn diff_trees(
    buggy_root: &Path,
    fixed_root: &Path,
    options: &ScanOptions,
) -> ExtractorResult<Vec<DiffRecord>> {
    let buggy_map = scan_keyed(buggy_root, options)?;
    let fixed_map = scan_keyed(fixed_root, options)?;

    let keys: BTreeSet<&SignatureKey> = buggy_map.keys().chain(fixed_map.keys()).collect();

    let mut results = Vec::new();
    for key in keys {
        let record = match (buggy_map.get(key), fixed_map.get(key)) {
            (Some(b), Some(f)) => {
                let code_changed = normalized_code(&b.code) != normalized_code(&f.code);
                let javadoc_changed = b.javadoc != f.javadoc;
                if !code_changed && !javadoc_changed {
                    continue;
                }
                DiffRecord {
                    status: DiffStatus::Modified,
                    signature: key.clone(),
                    buggy: Some(b.clone()),
                    fixed: Some(f.clone()),
                }
            }
            (Some(b), None) => DiffRecord {
                status: DiffStatus::Removed,
                signature: key.clone(),
                buggy: Some(b.clone()),
                fixed: None,
            },
            (None, Some(f)) => DiffRecord {
                status: DiffStatus::Added,
                signature: key.clone(),
                buggy: None,
                fixed: Some(f.clone()),
            },
            (None, None) => continue,
        };
        results.push(record);
    }

    debug!(
        buggy = buggy_map.len(),
        fixed = fixed_map.len(),
        changed = results.len(),
        "tree diff complete"
    );
    Ok(results)
}
