//! Macros known to a translation unit.

use rustc_hash::FxHashSet;

use super::parser::CTree;

/// Names of the object-like and function-like macros visible in a file.
///
/// Filled from `-D` compiler definitions and from the `#define` directives
/// of the file itself. Tree-sitter parses unexpanded text, so the table is
/// what tells a macro invocation apart from an ordinary identifier or call.
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    object_like: FxHashSet<String>,
    function_like: FxHashSet<String>,
}

impl MacroTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a command-line definition (`NAME`, `NAME=VALUE` or
    /// `NAME(args)=BODY`, the text following `-D`).
    pub fn define(&mut self, definition: &str) {
        let head = definition.split('=').next().unwrap_or_default().trim();
        if let Some((name, _)) = head.split_once('(') {
            if !name.is_empty() {
                self.function_like.insert(name.to_owned());
            }
        } else if !head.is_empty() {
            self.object_like.insert(head.to_owned());
        }
    }

    /// Records every `#define` directive of the translation unit.
    pub fn collect(&mut self, tree: &CTree) {
        for node in tree.pre_order() {
            let target = match node.kind() {
                "preproc_def" => &mut self.object_like,
                "preproc_function_def" => &mut self.function_like,
                _ => continue,
            };
            if let Some(name) = node.child_by_field_name("name") {
                target.insert(tree.text(name).to_owned());
            }
        }
    }

    /// Whether `name` is an object-like macro (a named constant).
    #[must_use]
    pub fn is_object_like(&self, name: &str) -> bool {
        self.object_like.contains(name)
    }

    /// Whether `name` is a function-like macro.
    #[must_use]
    pub fn is_function_like(&self, name: &str) -> bool {
        self.function_like.contains(name)
    }

    /// Whether `name` is defined as a macro of either kind.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.is_object_like(name) || self.is_function_like(name)
    }
}
