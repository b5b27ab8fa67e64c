//! Logical and spelling locations.
//!
//! A node's *logical* range is where the parser placed it. Its *spelling*
//! range is the literal text a user wrote. They differ whenever the node
//! comes out of macro machinery, and only spelled text can be rewritten.

use std::fmt;

use tree_sitter::Node;

use super::macros::MacroTable;
use super::parser::CTree;

/// A utility struct to convert byte offsets to line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 1-based `(line, column)` pair.
    ///
    /// Columns count bytes, so a tab or a multi-byte character occupies as
    /// many columns as it has bytes.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// Byte range of a node as seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalRange {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
}

impl LogicalRange {
    /// Range covering the whole node.
    #[must_use]
    pub fn of(node: Node<'_>) -> Self {
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    /// Whether the range covers no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end_byte <= self.start_byte
    }
}

/// Byte range of literally written text in the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellingRange {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
}

impl SpellingRange {
    /// Line/column coordinates of this range; the end is the last character.
    #[must_use]
    pub fn span(&self, lines: &LineIndex) -> SourceSpan {
        let (begin_line, begin_column) = lines.position(self.start_byte);
        let (end_line, end_column) = lines.position(self.end_byte.saturating_sub(1));
        SourceSpan {
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }
}

/// 1-based coordinates of a node in the original, unexpanded source.
///
/// Both ends are inclusive: `end_column` is the column of the last
/// character of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceSpan {
    /// Line of the first character.
    pub begin_line: usize,
    /// Column of the first character.
    pub begin_column: usize,
    /// Line of the last character.
    pub end_line: usize,
    /// Column of the last character.
    pub end_column: usize,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.begin_line, self.begin_column, self.end_line, self.end_column
        )
    }
}

/// Why a node has no spelling location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unlocatable {
    /// The node was synthesized by the parser and covers no written text.
    #[error("node has no written text")]
    Synthesized,
    /// The node sits inside a preprocessor directive.
    #[error("node is part of a preprocessor directive")]
    InsideDirective,
    /// The node is an argument of a function-like macro invocation; its
    /// expansion position is the whole invocation.
    #[error("node is an argument of macro `{0}`")]
    MacroArgument(String),
    /// The node sits in a conditional-compilation branch that is not
    /// compiled.
    #[error("node is in an inactive conditional-compilation branch")]
    InactiveBranch,
}

/// Map a logical range to the spelling range of the written text.
///
/// Fails for nodes that only exist after macro expansion or inside a
/// directive; callers treat this as "not instrumentable".
pub fn resolve_spelling(
    tree: &CTree,
    macros: &MacroTable,
    node: Node<'_>,
    logical: LogicalRange,
) -> Result<SpellingRange, Unlocatable> {
    if node.is_missing() || logical.is_empty() {
        return Err(Unlocatable::Synthesized);
    }

    let mut child = node;
    let mut ancestor = node.parent();
    while let Some(current) = ancestor {
        match current.kind() {
            "preproc_def" | "preproc_function_def" | "preproc_call" | "preproc_include" => {
                return Err(Unlocatable::InsideDirective);
            }
            "preproc_if" | "preproc_ifdef" | "preproc_elif" | "preproc_elifdef" => {
                if current.child_by_field_name("condition") == Some(child)
                    || current.child_by_field_name("name") == Some(child)
                {
                    return Err(Unlocatable::InsideDirective);
                }
                let in_alternative = current.child_by_field_name("alternative") == Some(child);
                if branch_condition(tree, macros, current) == Some(in_alternative) {
                    return Err(Unlocatable::InactiveBranch);
                }
            }
            "call_expression" if current.child_by_field_name("arguments") == Some(child) => {
                if let Some(function) = current.child_by_field_name("function") {
                    let name = tree.text(function);
                    if function.kind() == "identifier" && macros.is_function_like(name) {
                        return Err(Unlocatable::MacroArgument(name.to_owned()));
                    }
                }
            }
            _ => {}
        }
        child = current;
        ancestor = current.parent();
    }

    Ok(SpellingRange {
        start_byte: logical.start_byte,
        end_byte: logical.end_byte,
    })
}

/// Value of the controlling condition of a conditional directive, when it
/// can be decided without expanding macros.
///
/// An identifier that may be defined in an included header is unknown, and
/// unknown conditions keep both branches.
fn branch_condition(tree: &CTree, macros: &MacroTable, directive: Node<'_>) -> Option<bool> {
    match directive.kind() {
        "preproc_ifdef" | "preproc_elifdef" => {
            let name = directive.child_by_field_name("name")?;
            let defined = macros.is_defined(tree.text(name));
            let mut cursor = directive.walk();
            let keywords: Vec<Node<'_>> = directive.children(&mut cursor).collect();
            let negated = keywords
                .into_iter()
                .any(|keyword| matches!(keyword.kind(), "#ifndef" | "#elifndef"));
            Some(defined != negated)
        }
        "preproc_if" | "preproc_elif" => {
            evaluate_condition(tree, macros, directive.child_by_field_name("condition")?)
        }
        _ => None,
    }
}

fn evaluate_condition(tree: &CTree, macros: &MacroTable, condition: Node<'_>) -> Option<bool> {
    match condition.kind() {
        "number_literal" => {
            let digits = tree
                .text(condition)
                .trim_end_matches(['u', 'U', 'l', 'L']);
            digits.parse::<u64>().ok().map(|value| value != 0)
        }
        "preproc_defined" => {
            let mut cursor = condition.walk();
            let name = condition
                .named_children(&mut cursor)
                .find(|child| child.kind() == "identifier")?;
            Some(macros.is_defined(tree.text(name)))
        }
        "parenthesized_expression" => {
            let mut cursor = condition.walk();
            let inner = condition.named_children(&mut cursor).next()?;
            evaluate_condition(tree, macros, inner)
        }
        "unary_expression" => {
            let operator = condition.child_by_field_name("operator")?;
            if operator.kind() != "!" {
                return None;
            }
            let argument = condition.child_by_field_name("argument")?;
            evaluate_condition(tree, macros, argument).map(|value| !value)
        }
        _ => None,
    }
}
