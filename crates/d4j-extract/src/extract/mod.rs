//! Extraction passes: parsing, method scanning, javadoc association,
//! and whole-tree scanning.

pub mod javadoc;
pub mod methods;
pub mod parser;
pub mod tree;

pub use tree::{scan_tree, ScanOptions};
