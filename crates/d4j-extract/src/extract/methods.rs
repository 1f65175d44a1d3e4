//! Method and constructor extraction from one parsed source file.
//!
//! Traversal is depth-first in document order, maintaining an explicit
//! class-nesting stack pushed on entering a type declaration and popped on
//! leaving it. Method bodies are descended into as well, so members of local
//! and anonymous classes are found.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use tree_sitter::Node;

use crate::errors::ExtractorResult;
use crate::extract::javadoc::leading_javadoc;
use crate::extract::parser::parse_source;
use crate::models::MethodRecord;

const CLASS_LIKE_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"package\s+([A-Za-z0-9_.]+)\s*;").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static NAME_FALLBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][A-Za-z0-9_$]*)\s*\(").unwrap());

struct FileContext<'a> {
    source: &'a str,
    file_path: &'a str,
    package_name: String,
}

impl FileContext<'_> {
    fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }
}

/// Extract all method and constructor records from one file's source text,
/// in declaration order.
pub fn extract_from_source(source: &str, file_path: &str) -> ExtractorResult<Vec<MethodRecord>> {
    let tree = parse_source(source)?;
    let root = tree.root_node();

    let ctx = FileContext {
        source,
        file_path,
        package_name: find_package_name(root, source).unwrap_or_default(),
    };

    let mut records = Vec::new();
    let mut class_stack: Vec<String> = Vec::new();
    visit_children(root, &ctx, &mut class_stack, &mut records);
    Ok(records)
}

/// Package name from the root's `package_declaration`, if any.
fn find_package_name(root: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "package_declaration" {
            continue;
        }
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            if matches!(part.kind(), "scoped_identifier" | "identifier") {
                let text = part.utf8_text(source.as_bytes()).unwrap_or_default();
                return Some(text.trim().to_string());
            }
        }
        // Grammar variations: fall back to text matching on the declaration.
        let text = child.utf8_text(source.as_bytes()).unwrap_or_default();
        return PACKAGE_RE.captures(text).map(|caps| caps[1].to_string());
    }
    None
}

fn visit_children(
    node: Node<'_>,
    ctx: &FileContext<'_>,
    class_stack: &mut Vec<String>,
    records: &mut Vec<MethodRecord>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node(child, ctx, class_stack, records);
    }
}

fn visit_node(
    node: Node<'_>,
    ctx: &FileContext<'_>,
    class_stack: &mut Vec<String>,
    records: &mut Vec<MethodRecord>,
) {
    let kind = node.kind();
    if CLASS_LIKE_KINDS.contains(&kind) {
        match node.child_by_field_name("name") {
            Some(name) => {
                class_stack.push(ctx.node_text(name).trim().to_string());
                visit_children(node, ctx, class_stack, records);
                class_stack.pop();
            }
            None => {
                warn!(
                    file = ctx.file_path,
                    kind, "type declaration without a name, descending unnamed"
                );
                visit_children(node, ctx, class_stack, records);
            }
        }
        return;
    }

    if matches!(kind, "method_declaration" | "constructor_declaration") {
        if let Some(record) = method_record(node, ctx, class_stack) {
            records.push(record);
        }
    }
    visit_children(node, ctx, class_stack, records);
}

fn method_record(
    node: Node<'_>,
    ctx: &FileContext<'_>,
    class_stack: &[String],
) -> Option<MethodRecord> {
    let is_constructor = node.kind() == "constructor_declaration";

    let method_name = if is_constructor {
        // Constructors carry the innermost enclosing type name.
        match class_stack.last() {
            Some(name) => name.clone(),
            None => {
                warn!(
                    file = ctx.file_path,
                    line = node.start_position().row + 1,
                    "constructor outside any type declaration, skipping"
                );
                return None;
            }
        }
    } else {
        match declared_name(node, ctx) {
            Some(name) => name,
            None => {
                warn!(
                    file = ctx.file_path,
                    line = node.start_position().row + 1,
                    "method declaration without a resolvable name, skipping"
                );
                return None;
            }
        }
    };

    let return_type = if is_constructor {
        None
    } else {
        node.child_by_field_name("type")
            .map(|t| ctx.node_text(t).trim().to_string())
    };

    let parameters = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(p, ctx))
        .unwrap_or_default();

    Some(MethodRecord {
        file_path: ctx.file_path.to_string(),
        package_name: ctx.package_name.clone(),
        class_qualifier: class_stack.join("$"),
        method_name,
        parameters,
        return_type,
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        javadoc: leading_javadoc(ctx.source, node.start_byte()).unwrap_or_default(),
        code: ctx.node_text(node).to_string(),
    })
}

fn declared_name(node: Node<'_>, ctx: &FileContext<'_>) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(ctx.node_text(name).trim().to_string());
    }
    // Error-recovered nodes can lose the name field; derive it from the text.
    NAME_FALLBACK_RE
        .captures(ctx.node_text(node))
        .map(|caps| caps[1].to_string())
}

/// Raw parameter declaration text per parameter, whitespace collapsed but
/// otherwise as written: modifiers, annotations, and varargs markers survive.
fn extract_parameters(params_node: Node<'_>, ctx: &FileContext<'_>) -> Vec<String> {
    let mut params = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        if matches!(
            child.kind(),
            "formal_parameter" | "receiver_parameter" | "spread_parameter"
        ) {
            let text = WHITESPACE_RE.replace_all(ctx.node_text(child), " ");
            params.push(text.trim().to_string());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_class_with_documented_method() {
        let src = "class A { /** doc */ int m(int x) { return x; } }";
        let records = extract_from_source(src, "A.java").unwrap();
        assert_eq!(records.len(), 1);
        let m = &records[0];
        assert_eq!(m.method_name, "m");
        assert_eq!(m.parameters, vec!["int x".to_string()]);
        assert_eq!(m.return_type.as_deref(), Some("int"));
        assert_eq!(m.javadoc, "doc");
        assert_eq!(m.class_qualifier, "A");
        assert_eq!(m.package_name, "");
        assert!(m.start_line <= m.end_line);
        assert!(m.start_byte < m.end_byte);
        assert_eq!(&src[m.start_byte..m.end_byte], m.code);
    }

    #[test]
    fn package_name_is_extracted() {
        let src = "package com.example.app;\n\nclass A { void m() {} }\n";
        let records = extract_from_source(src, "A.java").unwrap();
        assert_eq!(records[0].package_name, "com.example.app");
        assert_eq!(records[0].fully_qualified_name(), "com.example.app.A.m");
    }

    #[test]
    fn nested_class_qualifier_is_dollar_joined() {
        let src = "\
class Outer {
    class Inner {
        void run() {}
    }
}
";
        let records = extract_from_source(src, "Outer.java").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_qualifier, "Outer$Inner");
        assert_eq!(records[0].method_name, "run");
    }

    #[test]
    fn constructor_uses_enclosing_type_name() {
        let src = "\
class Widget {
    Widget(int size) {}
}
";
        let records = extract_from_source(src, "Widget.java").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method_name, "Widget");
        assert!(records[0].return_type.is_none());
        assert_eq!(records[0].parameters, vec!["int size".to_string()]);
    }

    #[test]
    fn overloads_each_appear_once() {
        let src = "\
class A {
    void m(int x) {}
    void m(String x) {}
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parameters, vec!["int x".to_string()]);
        assert_eq!(records[1].parameters, vec!["String x".to_string()]);
    }

    #[test]
    fn declaration_order_is_preserved() {
        let src = "\
class A {
    void first() {}
    void second() {}
    class B {
        void third() {}
    }
    void fourth() {}
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.method_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn parameter_text_keeps_modifiers_and_varargs() {
        let src = "\
class A {
    void m(final int a, @Nullable String b, int... rest) {}
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        assert_eq!(
            records[0].parameters,
            vec![
                "final int a".to_string(),
                "@Nullable String b".to_string(),
                "int... rest".to_string(),
            ]
        );
    }

    #[test]
    fn span_includes_modifiers_and_annotations() {
        let src = "\
class A {
    @Override
    public void m() {}
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        assert!(records[0].code.starts_with("@Override"));
        assert_eq!(records[0].start_line, 2);
        assert_eq!(records[0].end_line, 3);
    }

    #[test]
    fn enum_and_interface_members_are_found() {
        let src = "\
enum Color {
    RED;
    String label() { return name(); }
}
interface Task {
    void run();
}
";
        let records = extract_from_source(src, "Misc.java").unwrap();
        let quals: Vec<String> = records
            .iter()
            .map(|r| format!("{}.{}", r.class_qualifier, r.method_name))
            .collect();
        assert!(quals.contains(&"Color.label".to_string()));
        assert!(quals.contains(&"Task.run".to_string()));
    }

    #[test]
    fn local_class_method_inside_method_body() {
        let src = "\
class A {
    void outer() {
        class Local {
            void inner() {}
        }
    }
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.method_name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        let inner = records.iter().find(|r| r.method_name == "inner").unwrap();
        assert_eq!(inner.class_qualifier, "A$Local");
    }

    #[test]
    fn unparseable_region_does_not_abort_the_file() {
        let src = "\
class A {
    void good() {}
    %%% garbage %%%
}
";
        let records = extract_from_source(src, "A.java").unwrap();
        assert!(records.iter().any(|r| r.method_name == "good"));
    }
}
