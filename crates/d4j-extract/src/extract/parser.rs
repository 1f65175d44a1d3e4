//! Tree-sitter Java parser construction.

use tree_sitter::{Parser, Tree};

use crate::errors::{ExtractorError, ExtractorResult};

/// Parse Java source into a tree-sitter syntax tree.
///
/// The grammar is the external `tree-sitter-java` crate; this module only
/// consumes the tree it produces.
pub fn parse_source(source: &str) -> ExtractorResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| ExtractorError::Parse(format!("failed to load Java grammar: {e}")))?;
    parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| ExtractorError::Parse("tree-sitter parse returned no tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let tree = parse_source("class A {}").unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn parses_broken_source_without_failing() {
        // Tree-sitter produces a tree with error nodes rather than failing;
        // downstream passes skip what they cannot name.
        let tree = parse_source("class {{{").unwrap();
        assert!(tree.root_node().has_error());
    }
}
