//! Name lookup against the declarations of a translation unit.
//!
//! This is a syntactic approximation of C scoping: starting at a use site,
//! each enclosing block, function parameter list, `for` initializer and
//! finally the file scope is searched for a declarator with the same name.

use tree_sitter::Node;

use super::parser::CTree;
use crate::constants::INTEGER_TYPE_NAMES;

/// Shape of a declared object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredShape {
    /// A plain object (`int x`).
    Scalar,
    /// Declared through at least one pointer declarator (`int *p`).
    Pointer,
    /// An array (`int a[4]`).
    Array,
}

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    /// Whether the base type is an integer type.
    pub integral: bool,
    /// Object shape.
    pub shape: DeclaredShape,
}

impl Declared {
    /// Whether a store to this name writes an integer.
    #[must_use]
    pub fn is_integer_scalar(&self) -> bool {
        self.integral && self.shape == DeclaredShape::Scalar
    }

    /// Whether a store to an element of this name writes an integer.
    #[must_use]
    pub fn has_integer_elements(&self) -> bool {
        self.integral && self.shape != DeclaredShape::Scalar
    }
}

/// Resolve `name` as seen from `from`.
#[must_use]
pub fn lookup(tree: &CTree, from: Node<'_>, name: &str) -> Option<Declared> {
    let mut ancestor = from.parent();
    while let Some(scope) = ancestor {
        let found = match scope.kind() {
            "compound_statement" | "translation_unit" => search_block(tree, scope, name),
            "for_statement" => scope
                .child_by_field_name("initializer")
                .filter(|init| init.kind() == "declaration")
                .and_then(|init| search_declaration(tree, init, name)),
            "function_definition" => search_parameters(tree, scope, name),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
        ancestor = scope.parent();
    }
    None
}

/// Resolve the declarator of a `declaration` node directly.
#[must_use]
pub fn declared_in(tree: &CTree, declaration: Node<'_>, declarator: Node<'_>) -> Option<Declared> {
    let ty = declaration.child_by_field_name("type")?;
    let (_, shape) = declarator_name(declarator)?;
    Some(Declared {
        integral: integral_type(tree, ty),
        shape,
    })
}

/// Whether a type specifier node names an integer type.
fn integral_type(tree: &CTree, ty: Node<'_>) -> bool {
    match ty.kind() {
        "primitive_type" | "type_identifier" => INTEGER_TYPE_NAMES.contains(&tree.text(ty)),
        // `unsigned`, `long`, `unsigned int`; `long double` is not
        "sized_type_specifier" => ty
            .child_by_field_name("type")
            .is_none_or(|inner| integral_type(tree, inner)),
        "enum_specifier" => true,
        _ => false,
    }
}

fn search_block(tree: &CTree, block: Node<'_>, name: &str) -> Option<Declared> {
    let mut cursor = block.walk();
    let declarations: Vec<Node<'_>> = block
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "declaration")
        .collect();
    declarations
        .into_iter()
        .find_map(|declaration| search_declaration(tree, declaration, name))
}

fn search_declaration(tree: &CTree, declaration: Node<'_>, name: &str) -> Option<Declared> {
    let mut cursor = declaration.walk();
    let declarators: Vec<Node<'_>> = declaration
        .children_by_field_name("declarator", &mut cursor)
        .collect();
    declarators.into_iter().find_map(|declarator| {
        let (ident, _) = declarator_name(declarator)?;
        if tree.text(ident) == name {
            declared_in(tree, declaration, declarator)
        } else {
            None
        }
    })
}

fn search_parameters(tree: &CTree, function: Node<'_>, name: &str) -> Option<Declared> {
    let mut declarator = function.child_by_field_name("declarator")?;
    while declarator.kind() != "function_declarator" {
        declarator = declarator.child_by_field_name("declarator")?;
    }
    let parameters = declarator.child_by_field_name("parameters")?;
    let mut cursor = parameters.walk();
    let params: Vec<Node<'_>> = parameters
        .named_children(&mut cursor)
        .filter(|p| p.kind() == "parameter_declaration")
        .collect();
    params.into_iter().find_map(|param| {
        let declarator = param.child_by_field_name("declarator")?;
        let (ident, _) = declarator_name(declarator)?;
        if tree.text(ident) == name {
            declared_in(tree, param, declarator)
        } else {
            None
        }
    })
}

/// Innermost identifier of a declarator and the shape it gives the object.
fn declarator_name(declarator: Node<'_>) -> Option<(Node<'_>, DeclaredShape)> {
    match declarator.kind() {
        "identifier" => Some((declarator, DeclaredShape::Scalar)),
        "init_declarator" | "attributed_declarator" | "parenthesized_declarator" => {
            let inner = match declarator.child_by_field_name("declarator") {
                Some(inner) => inner,
                None => {
                    let mut cursor = declarator.walk();
                    let first = declarator.named_children(&mut cursor).next()?;
                    first
                }
            };
            declarator_name(inner)
        }
        "pointer_declarator" => {
            let (ident, _) = declarator_name(declarator.child_by_field_name("declarator")?)?;
            Some((ident, DeclaredShape::Pointer))
        }
        "array_declarator" => {
            let (ident, shape) = declarator_name(declarator.child_by_field_name("declarator")?)?;
            let shape = match shape {
                DeclaredShape::Scalar => DeclaredShape::Array,
                other => other,
            };
            Some((ident, shape))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CParser;

    fn find_use<'t>(tree: &'t CTree, needle: &str) -> Node<'t> {
        let offset = tree.source().rfind(needle).unwrap();
        tree.pre_order()
            .find(|n| n.kind() == "identifier" && n.start_byte() == offset)
            .unwrap()
    }

    #[test]
    fn test_local_integer() {
        let source = "void f(void) {\n  int count;\n  count = 1;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let found = lookup(&tree, find_use(&tree, "count ="), "count").unwrap();
        assert!(found.is_integer_scalar());
    }

    #[test]
    fn test_parameter_pointer() {
        let source = "void f(int *p) {\n  p = 0;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let found = lookup(&tree, find_use(&tree, "p ="), "p").unwrap();
        assert_eq!(found.shape, DeclaredShape::Pointer);
        assert!(!found.is_integer_scalar());
        assert!(found.has_integer_elements());
    }

    #[test]
    fn test_global_double_is_not_integral() {
        let source = "double ratio;\nvoid f(void) {\n  ratio = 2;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let found = lookup(&tree, find_use(&tree, "ratio ="), "ratio").unwrap();
        assert!(!found.integral);
    }

    #[test]
    fn test_sized_and_typedef_types() {
        let source = "unsigned long total;\nsize_t len;\nlong double ratio;\n\
                      void f(void) { total = 1; len = 2; ratio = 3; }\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let total = lookup(&tree, find_use(&tree, "total ="), "total").unwrap();
        let len = lookup(&tree, find_use(&tree, "len ="), "len").unwrap();
        let ratio = lookup(&tree, find_use(&tree, "ratio ="), "ratio").unwrap();
        assert!(total.integral);
        assert!(len.integral);
        assert!(!ratio.integral);
    }

    #[test]
    fn test_array_shape() {
        let source = "void f(void) {\n  int buf[4];\n  buf[0] = 1;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        let found = lookup(&tree, find_use(&tree, "buf["), "buf").unwrap();
        assert_eq!(found.shape, DeclaredShape::Array);
        assert!(found.has_integer_elements());
    }

    #[test]
    fn test_unknown_name() {
        let source = "void f(void) {\n  missing = 1;\n}\n";
        let tree = CParser::new().unwrap().parse(source).unwrap();
        assert!(lookup(&tree, find_use(&tree, "missing"), "missing").is_none());
    }
}
