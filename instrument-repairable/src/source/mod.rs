//! Source model for C translation units.
//!
//! This module wraps the tree-sitter C grammar and provides:
//! - Parsing with syntax-error detection (`CParser`, `CTree`)
//! - Byte offset to line/column mapping (`LineIndex`)
//! - The logical/spelling location split and its resolver
//! - Macro and declaration lookups used by the node predicates
//!
//! # Design Principles
//!
//! - **Parse once, query many**: the tree is read-only after parsing
//! - **Byte-range anchored**: every location starts as a byte range
//! - **Unlocatable is a value**: nodes without a spelling are reported as
//!   `Unlocatable`, never as a panic

mod location;
mod macros;
mod parser;
mod scope;

pub use location::{
    resolve_spelling, LineIndex, LogicalRange, SourceSpan, SpellingRange, Unlocatable,
};
pub use macros::MacroTable;
pub use parser::{CParser, CTree, PreOrder, SourceError};
pub use scope::{declared_in, lookup, Declared, DeclaredShape};
