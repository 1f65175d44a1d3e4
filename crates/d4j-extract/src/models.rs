//! Value records produced by the scan and diff passes.
//!
//! All types here are immutable once constructed and serialize with `serde`
//! into the artifact schemas consumed by downstream tooling.

use serde::{Deserialize, Serialize};

/// One extracted Java method or constructor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Path of the source file as walked (absolute or root-relative).
    pub file_path: String,
    /// Dotted package path, empty when the file declares no package.
    pub package_name: String,
    /// `$`-joined nesting path of enclosing type names, e.g. `Outer$Inner`.
    pub class_qualifier: String,
    /// Declared identifier; constructors carry the enclosing simple type name.
    pub method_name: String,
    /// Raw parameter declarations in order, whitespace collapsed.
    pub parameters: Vec<String>,
    /// Raw return type text; `None` for constructors.
    pub return_type: Option<String>,
    /// 1-based inclusive line span of the full declaration including modifiers.
    pub start_line: usize,
    pub end_line: usize,
    /// Byte offsets of the same span, for exact slicing.
    pub start_byte: usize,
    pub end_byte: usize,
    /// Normalized leading documentation comment, empty when none was found.
    pub javadoc: String,
    /// Verbatim source text of the declaration span.
    pub code: String,
}

impl MethodRecord {
    /// Dotted `package.Class$Inner.method` name, skipping empty components.
    pub fn fully_qualified_name(&self) -> String {
        [
            self.package_name.as_str(),
            self.class_qualifier.as_str(),
            self.method_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Structural identity key correlating a method across two scanned trees.
///
/// The relative path is part of the key, so a file rename shows up as an
/// added+removed pair rather than a modification. Parameter types are not
/// included: overloads sharing an arity collapse onto one key per side, with
/// the last declaration winning.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignatureKey {
    pub file_rel_path: String,
    pub class_qualifier: String,
    pub method_name: String,
    pub arity: usize,
}

impl SignatureKey {
    pub fn new(file_rel_path: &str, record: &MethodRecord) -> Self {
        Self {
            file_rel_path: file_rel_path.to_string(),
            class_qualifier: record.class_qualifier.clone(),
            method_name: record.method_name.clone(),
            arity: record.arity(),
        }
    }
}

/// Classification of one cross-tree comparison outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Modified,
    Added,
    Removed,
}

/// One outcome of comparing the buggy and fixed trees.
///
/// `buggy` is present unless the status is `added`; `fixed` is present unless
/// the status is `removed`. Methods identical on both sides are never emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub status: DiffStatus,
    pub signature: SignatureKey,
    pub buggy: Option<MethodRecord>,
    pub fixed: Option<MethodRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(package: &str, class: &str, name: &str, params: &[&str]) -> MethodRecord {
        MethodRecord {
            file_path: "A.java".to_string(),
            package_name: package.to_string(),
            class_qualifier: class.to_string(),
            method_name: name.to_string(),
            parameters: params.iter().map(|p| p.to_string()).collect(),
            return_type: None,
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 1,
            javadoc: String::new(),
            code: String::new(),
        }
    }

    #[test]
    fn fully_qualified_name_joins_non_empty_parts() {
        let m = record("com.example", "Outer$Inner", "run", &[]);
        assert_eq!(m.fully_qualified_name(), "com.example.Outer$Inner.run");
    }

    #[test]
    fn fully_qualified_name_skips_missing_package() {
        let m = record("", "A", "m", &["int x"]);
        assert_eq!(m.fully_qualified_name(), "A.m");
    }

    #[test]
    fn signature_key_uses_arity_not_types() {
        let a = record("", "A", "m", &["int x"]);
        let b = record("", "A", "m", &["String x"]);
        assert_eq!(SignatureKey::new("A.java", &a), SignatureKey::new("A.java", &b));
    }

    #[test]
    fn signature_key_orders_like_a_tuple() {
        let a = record("", "A", "m", &[]);
        let key_a = SignatureKey::new("A.java", &a);
        let key_b = SignatureKey::new("B.java", &a);
        assert!(key_a < key_b);
    }

    #[test]
    fn diff_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DiffStatus::Modified).unwrap(),
            "\"modified\""
        );
        assert_eq!(serde_json::to_string(&DiffStatus::Added).unwrap(), "\"added\"");
    }
}
