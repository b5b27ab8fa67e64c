//! Tree-sitter based parser for C source code.
//!
//! Provides the read-only syntax tree the instrumentation engine traverses.

use tree_sitter::{Node, Parser, Tree, TreeCursor};

use super::location::LineIndex;

/// Error raised while building the syntax tree of a translation unit.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Failed to create the parser.
    #[error("Failed to create C parser: {0}")]
    ParserCreation(String),
    /// The parser gave up without producing a tree.
    #[error("Failed to parse source as C")]
    ParseFailed,
    /// The tree contains an error or a missing token.
    #[error("Syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-based line of the first error node.
        line: usize,
        /// 1-based column of the first error node.
        column: usize,
    },
}

/// A parsed translation unit.
pub struct CTree {
    tree: Tree,
    source: String,
    lines: LineIndex,
}

impl CTree {
    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Original source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line index over the original source.
    #[must_use]
    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
    }

    /// Iterate over every node (named and anonymous) in pre-order.
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            cursor: self.tree.walk(),
            done: false,
        }
    }
}

impl std::fmt::Debug for CTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CTree")
            .field("root", &self.root().kind())
            .field("len", &self.source.len())
            .finish()
    }
}

/// Pre-order traversal over a tree, driven by a single cursor.
pub struct PreOrder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            while !self.cursor.goto_next_sibling() {
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

/// Tree-sitter based C parser
pub struct CParser {
    parser: Parser,
}

impl CParser {
    /// Create a new parser for C
    ///
    /// # Errors
    /// Returns error if the grammar cannot be loaded
    pub fn new() -> Result<Self, SourceError> {
        let mut parser = Parser::new();

        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| SourceError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse a translation unit.
    ///
    /// A tree containing error recovery nodes is rejected: the engine never
    /// instruments a file it could not parse cleanly.
    ///
    /// # Errors
    /// Returns error if parsing fails or the source has syntax errors
    pub fn parse(&mut self, source: &str) -> Result<CTree, SourceError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(SourceError::ParseFailed)?;

        if let Some(bad) = first_error(tree.root_node()) {
            let position = bad.start_position();
            return Err(SourceError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        Ok(CTree {
            tree,
            source: source.to_owned(),
            lines: LineIndex::new(source),
        })
    }
}

/// Innermost ERROR or MISSING node of the first erroneous subtree.
///
/// Recovery can wrap a large span, even the whole file, in one ERROR node;
/// the nested error points at the offending token.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    let erroneous = node.is_error() || node.is_missing();
    if !erroneous && !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(first_error)
        .or_else(|| erroneous.then_some(node))
}
