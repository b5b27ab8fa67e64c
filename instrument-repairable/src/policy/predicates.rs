//! Concrete node-selection predicates over the C syntax tree.

use tree_sitter::Node;

use super::Predicate;
use crate::constants::{REPAIRABLE_BINARY_OPERATORS, REPAIRABLE_UNARY_OPERATORS};
use crate::source::{self, CTree, MacroTable};

/// What a predicate may consult besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// The parsed translation unit.
    pub tree: &'a CTree,
    /// Macros known to the translation unit.
    pub macros: &'a MacroTable,
}

impl Predicate {
    /// Whether this predicate selects `node`.
    #[must_use]
    pub fn matches(self, node: Node<'_>, cx: &MatchContext<'_>) -> bool {
        if !node.is_named() || node.is_extra() {
            return false;
        }
        match self {
            Self::InterestingCondition => {
                condition_owner(node).is_some() && is_repairable_expression(node)
            }
            Self::InterestingIntegerAssignment => is_integer_assignment(node, cx),
            Self::RepairableIfCondition => {
                condition_owner(node) == Some("if_statement") && is_repairable_expression(node)
            }
            Self::NonTrivialRepairableIfCondition => {
                Self::RepairableIfCondition.matches(node, cx) && references_variable(node, cx)
            }
            Self::RepairableLoopCondition => {
                matches!(
                    condition_owner(node),
                    Some("while_statement" | "do_statement" | "for_statement")
                ) && is_repairable_expression(node)
            }
            Self::NonTrivialRepairableLoopCondition => {
                Self::RepairableLoopCondition.matches(node, cx) && references_variable(node, cx)
            }
            Self::RepairableAssignment => {
                assignment_target(node).is_some() && is_repairable_expression(node)
            }
            Self::NonTrivialRepairableAssignment => {
                Self::RepairableAssignment.matches(node, cx) && references_variable(node, cx)
            }
            Self::InterestingStatement => is_interesting_statement(node),
        }
    }
}

/// Whether an expression is built only from operands and operators a
/// repair tool can synthesize: variables, integer and character literals,
/// member and element accesses, arithmetic, bitwise, relational and logical
/// operators, casts and `sizeof`.
#[must_use]
pub fn is_repairable_expression(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "number_literal" | "char_literal" | "true" | "false"
        | "sizeof_expression" => true,
        "parenthesized_expression" | "subscript_expression" => all_named_children(node),
        "field_expression" => node
            .child_by_field_name("argument")
            .is_some_and(is_repairable_expression),
        "cast_expression" => node
            .child_by_field_name("value")
            .is_some_and(is_repairable_expression),
        "unary_expression" => {
            operator_in(node, REPAIRABLE_UNARY_OPERATORS)
                && node
                    .child_by_field_name("argument")
                    .is_some_and(is_repairable_expression)
        }
        "binary_expression" => {
            operator_in(node, REPAIRABLE_BINARY_OPERATORS)
                && node
                    .child_by_field_name("left")
                    .is_some_and(is_repairable_expression)
                && node
                    .child_by_field_name("right")
                    .is_some_and(is_repairable_expression)
        }
        _ => false,
    }
}

/// Whether an expression reads a variable, as opposed to being made only
/// of literals, macro constants and `sizeof`.
#[must_use]
pub fn references_variable(node: Node<'_>, cx: &MatchContext<'_>) -> bool {
    match node.kind() {
        "identifier" => !cx.macros.is_object_like(cx.tree.text(node)),
        "sizeof_expression" => false,
        "field_expression" => node
            .child_by_field_name("argument")
            .is_some_and(|argument| references_variable(argument, cx)),
        "cast_expression" => node
            .child_by_field_name("value")
            .is_some_and(|value| references_variable(value, cx)),
        _ => {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            children
                .into_iter()
                .any(|child| references_variable(child, cx))
        }
    }
}

/// Kind of the statement whose controlling condition is `node`.
fn condition_owner(node: Node<'_>) -> Option<&'static str> {
    let parent = node.parent()?;
    if parent.kind() == "for_statement" {
        return (parent.child_by_field_name("condition") == Some(node)).then_some("for_statement");
    }
    if parent.kind() != "parenthesized_expression" || node.kind() == "comment" {
        return None;
    }
    let owner = parent.parent()?;
    if owner.child_by_field_name("condition") != Some(parent) {
        return None;
    }
    match owner.kind() {
        kind @ ("if_statement" | "while_statement" | "do_statement") => Some(kind),
        _ => None,
    }
}

/// The assigned object when `node` is the value of a plain `=` assignment
/// or of an initializer.
fn assignment_target(node: Node<'_>) -> Option<Node<'_>> {
    let parent = node.parent()?;
    match parent.kind() {
        "assignment_expression" => {
            let operator = parent.child_by_field_name("operator")?;
            if operator.kind() != "=" || parent.child_by_field_name("right") != Some(node) {
                return None;
            }
            parent.child_by_field_name("left")
        }
        "init_declarator" => {
            if parent.child_by_field_name("value") != Some(node)
                || !is_automatic_declaration(parent.parent()?)
            {
                return None;
            }
            parent.child_by_field_name("declarator")
        }
        _ => None,
    }
}

/// Whether `declaration` declares block-scope objects initialized at run
/// time. File-scope, `static`, `extern` and thread-local initializers must
/// stay constant expressions, which a statement expression is not.
fn is_automatic_declaration(declaration: Node<'_>) -> bool {
    if declaration.kind() != "declaration" {
        return false;
    }
    let mut in_function = false;
    let mut ancestor = declaration.parent();
    while let Some(current) = ancestor {
        if current.kind() == "function_definition" {
            in_function = true;
            break;
        }
        ancestor = current.parent();
    }
    if !in_function {
        return false;
    }

    let mut cursor = declaration.walk();
    let specifiers: Vec<Node<'_>> = declaration
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "storage_class_specifier")
        .collect();
    !specifiers.into_iter().any(|specifier| {
        let mut cursor = specifier.walk();
        let keywords: Vec<Node<'_>> = specifier.children(&mut cursor).collect();
        keywords.into_iter().any(|keyword| {
            matches!(
                keyword.kind(),
                "static" | "extern" | "_Thread_local" | "__thread" | "thread_local"
            )
        })
    })
}

fn is_integer_assignment(node: Node<'_>, cx: &MatchContext<'_>) -> bool {
    let Some(target) = assignment_target(node) else {
        return false;
    };
    if !is_repairable_expression(node) {
        return false;
    }
    let Some(parent) = node.parent() else {
        return false;
    };

    if parent.kind() == "init_declarator" {
        return parent
            .parent()
            .filter(|declaration| declaration.kind() == "declaration")
            .and_then(|declaration| source::declared_in(cx.tree, declaration, parent))
            .is_some_and(|declared| declared.is_integer_scalar());
    }

    match target.kind() {
        "identifier" => source::lookup(cx.tree, target, cx.tree.text(target))
            .is_some_and(|declared| declared.is_integer_scalar()),
        "subscript_expression" => target
            .child_by_field_name("argument")
            .filter(|base| base.kind() == "identifier")
            .and_then(|base| source::lookup(cx.tree, base, cx.tree.text(base)))
            .is_some_and(|declared| declared.has_integer_elements()),
        _ => false,
    }
}

fn is_interesting_statement(node: Node<'_>) -> bool {
    if node.parent().is_none_or(|parent| parent.kind() != "compound_statement") {
        return false;
    }
    match node.kind() {
        "expression_statement" => {
            let mut cursor = node.walk();
            let first = node
                .named_children(&mut cursor)
                .find(|child| child.kind() != "comment");
            first.is_some_and(|expression| {
                matches!(
                    expression.kind(),
                    "assignment_expression" | "update_expression" | "call_expression"
                )
            })
        }
        "break_statement" | "continue_statement" | "return_statement" => true,
        _ => false,
    }
}

fn operator_in(node: Node<'_>, allowed: &[&str]) -> bool {
    node.child_by_field_name("operator")
        .is_some_and(|operator| allowed.contains(&operator.kind()))
}

fn all_named_children(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    !children.is_empty() && children.into_iter().all(is_repairable_expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CParser;

    struct Fixture {
        tree: CTree,
        macros: MacroTable,
    }

    impl Fixture {
        fn new(source: &str) -> Self {
            let tree = CParser::new().unwrap().parse(source).unwrap();
            let mut macros = MacroTable::new();
            macros.collect(&tree);
            Self { tree, macros }
        }

        fn selected(&self, predicate: Predicate) -> Vec<String> {
            let cx = MatchContext {
                tree: &self.tree,
                macros: &self.macros,
            };
            self.tree
                .pre_order()
                .filter(|node| predicate.matches(*node, &cx))
                .map(|node| self.tree.text(node).to_owned())
                .collect()
        }
    }

    const PROGRAM: &str = r"#define LIMIT 10
int g(int);
int f(int a, int *p) {
  int i;
  int n = a + 1;
  double d = 0;
  if (a > 0) {
    n = n - 1;
  }
  if (LIMIT) {
    g(a);
  }
  if (g(a)) {
    return 1;
  }
  while (i < n) {
    i++;
    if (i == 3) break;
  }
  for (i = 0; i != LIMIT; i++) {
    p[i] = 1;
  }
  do { n--; } while (n);
  d = a;
  return n;
}
";

    #[test]
    fn test_if_conditions() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::RepairableIfCondition),
            vec!["a > 0", "LIMIT", "i == 3"]
        );
    }

    #[test]
    fn test_non_trivial_if_conditions_skip_macro_constant() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::NonTrivialRepairableIfCondition),
            vec!["a > 0", "i == 3"]
        );
    }

    #[test]
    fn test_loop_conditions() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::RepairableLoopCondition),
            vec!["i < n", "i != LIMIT", "n"]
        );
    }

    #[test]
    fn test_assignments() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::RepairableAssignment),
            vec!["a + 1", "0", "n - 1", "0", "1", "a"]
        );
    }

    #[test]
    fn test_non_trivial_assignments() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::NonTrivialRepairableAssignment),
            vec!["a + 1", "n - 1", "a"]
        );
    }

    #[test]
    fn test_integer_assignments_skip_double() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::InterestingIntegerAssignment),
            vec!["a + 1", "n - 1", "0", "1"]
        );
    }

    #[test]
    fn test_interesting_conditions_cover_ifs_and_loops() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::InterestingCondition),
            vec!["a > 0", "LIMIT", "i < n", "i == 3", "i != LIMIT", "n"]
        );
    }

    #[test]
    fn test_interesting_statements() {
        let fixture = Fixture::new(PROGRAM);
        assert_eq!(
            fixture.selected(Predicate::InterestingStatement),
            vec![
                "n = n - 1;",
                "g(a);",
                "return 1;",
                "i++;",
                "p[i] = 1;",
                "n--;",
                "d = a;",
                "return n;"
            ]
        );
    }

    #[test]
    fn test_static_storage_initializers_are_not_assignments() {
        let fixture = Fixture::new(
            "int limit = 10;\n\
             int f(int a) {\n\
             \x20 static int calls = 0;\n\
             \x20 extern int shared;\n\
             \x20 int local = a + 1;\n\
             \x20 calls = limit;\n\
             \x20 return local;\n\
             }\n",
        );
        assert_eq!(
            fixture.selected(Predicate::RepairableAssignment),
            vec!["a + 1", "limit"]
        );
        assert_eq!(
            fixture.selected(Predicate::InterestingIntegerAssignment),
            vec!["a + 1", "limit"]
        );
    }

    #[test]
    fn test_repairable_expression_rejects_side_effects() {
        let fixture = Fixture::new(
            "int f(int a, int *p) { if (a++ > 0 || *p || g(a)) return 1; return 0; }",
        );
        assert!(fixture.selected(Predicate::RepairableIfCondition).is_empty());
    }
}
