//! Location resolver: from a matched node to the span that gets rewritten.

use tree_sitter::Node;

use crate::policy::NodeCategory;
use crate::source::{
    resolve_spelling, CTree, LogicalRange, MacroTable, SourceSpan, SpellingRange, Unlocatable,
};

/// Where a matched node was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Byte range to replace in the original buffer.
    pub spelling: SpellingRange,
    /// Line/column form of `spelling`, as reported and traced.
    pub span: SourceSpan,
}

/// Resolve the span of `node` for its handler category.
///
/// Expressions cover the whole node. Statements stop before their
/// terminating `;`, which stays after the wrapper in the rewritten text.
///
/// # Errors
/// Returns [`Unlocatable`] if the node has no written text of its own
pub fn resolve(
    tree: &CTree,
    macros: &MacroTable,
    node: Node<'_>,
    category: NodeCategory,
) -> Result<Resolved, Unlocatable> {
    let logical = match category {
        NodeCategory::Expression => LogicalRange::of(node),
        NodeCategory::Statement => statement_range(node),
    };
    let spelling = resolve_spelling(tree, macros, node, logical)?;
    Ok(Resolved {
        spelling,
        span: spelling.span(tree.lines()),
    })
}

fn statement_range(node: Node<'_>) -> LogicalRange {
    let mut cursor = node.walk();
    let end_byte = node
        .children(&mut cursor)
        .filter(|child| child.kind() != ";")
        .last()
        .map_or(node.end_byte(), |child| child.end_byte());
    LogicalRange {
        start_byte: node.start_byte(),
        end_byte,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CParser;

    fn first<'t>(tree: &'t CTree, kind: &str) -> Node<'t> {
        tree.pre_order().find(|n| n.kind() == kind).unwrap()
    }

    #[test]
    fn test_expression_span() {
        let source = "int f(int x) {\n  if (x > 0) { return 1; }\n  return 0;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let node = first(&tree, "binary_expression");

        let resolved = resolve(&tree, &MacroTable::new(), node, NodeCategory::Expression).unwrap();
        assert_eq!(resolved.span.to_string(), "2 7 2 11");
        assert_eq!(
            &source[resolved.spelling.start_byte..resolved.spelling.end_byte],
            "x > 0"
        );
    }

    #[test]
    fn test_statement_span_excludes_semicolon() {
        let source = "void f(int y) {\n  y = 1;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let node = first(&tree, "expression_statement");

        let resolved = resolve(&tree, &MacroTable::new(), node, NodeCategory::Statement).unwrap();
        assert_eq!(
            &source[resolved.spelling.start_byte..resolved.spelling.end_byte],
            "y = 1"
        );
        assert_eq!(resolved.span.to_string(), "2 3 2 7");
    }

    #[test]
    fn test_break_statement_span() {
        let source = "void f(void) {\n  for (;;) {\n    break;\n  }\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let node = first(&tree, "break_statement");

        let resolved = resolve(&tree, &MacroTable::new(), node, NodeCategory::Statement).unwrap();
        assert_eq!(resolved.span.to_string(), "3 5 3 9");
    }

    #[test]
    fn test_multi_line_expression() {
        let source = "int f(int a, int b) {\n  return (a &&\n          b);\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let node = first(&tree, "parenthesized_expression");

        let resolved = resolve(&tree, &MacroTable::new(), node, NodeCategory::Expression).unwrap();
        assert_eq!(resolved.span.to_string(), "2 10 3 12");
    }

    #[test]
    fn test_macro_argument_is_unlocatable() {
        let source = "int f(int a) { return CHECK(a > 1); }\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let mut macros = MacroTable::new();
        macros.define("CHECK(c)=c");
        let node = first(&tree, "binary_expression");

        let result = resolve(&tree, &macros, node, NodeCategory::Expression);
        assert_eq!(result, Err(Unlocatable::MacroArgument("CHECK".to_owned())));
    }
}
