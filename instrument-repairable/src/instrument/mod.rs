//! Instrumentation engine.
//!
//! One pass over one translation unit: every node is offered to the active
//! predicates in policy order, and the first predicate that selects it
//! decides how the node is handled. A handled node is resolved to its
//! written span, rendered, wrapped with a trace call, registered with the
//! edit buffer and finally reported.
//!
//! # Usage
//!
//! ```
//! use instrument_repairable::config::DefectClassConfig;
//! use instrument_repairable::instrument::{Instrumenter, ReportSink};
//! use instrument_repairable::policy::Policy;
//! use instrument_repairable::source::MacroTable;
//!
//! let config = DefectClassConfig {
//!     if_conditions: true,
//!     ..DefectClassConfig::default()
//! };
//! let policy = Policy::from_config(&config);
//! let macros = MacroTable::new();
//! let mut instrumenter = Instrumenter::new(&policy, &macros).expect("grammar loads");
//! let mut sink = ReportSink::new(Vec::new());
//!
//! let outcome = instrumenter
//!     .instrument("int f(int x) { if (x > 0) return 1; return 0; }\n", &mut sink)
//!     .expect("instruments");
//! assert_eq!(outcome.stats.instrumented, 1);
//! assert!(outcome
//!     .buffer
//!     .text()
//!     .contains("if (({ angelix_trace(1, 20, 1, 24); x > 0; }))"));
//! ```

mod render;
mod report;
mod resolver;
mod wrap;

pub use render::render;
pub use report::ReportSink;
pub use resolver::{resolve, Resolved};
pub use wrap::{trace_call, wrap_expression, wrap_statement};

use std::io::Write;

use tree_sitter::Node;

use crate::edit::{Edit, RewriteError, TranslationUnitBuffer};
use crate::policy::{MatchContext, NodeCategory, Policy, Predicate};
use crate::source::{
    CParser, CTree, MacroTable, SourceError, SourceSpan, SpellingRange, Unlocatable,
};

/// Error raised while instrumenting a translation unit.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    /// The source could not be parsed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// An edit was malformed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    /// The report could not be written.
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

/// A selected node together with where it was written.
#[derive(Debug, Clone, Copy)]
pub struct Located<'t> {
    /// The syntax node.
    pub node: Node<'t>,
    /// Byte range of its written text.
    pub spelling: SpellingRange,
    /// Reported coordinates.
    pub span: SourceSpan,
    /// Original text, byte for byte.
    pub text: &'t str,
}

/// A node selected by the policy, tagged with its handler.
#[derive(Debug, Clone, Copy)]
pub enum RepairableNode<'t> {
    /// Value position; wrapped as a statement expression.
    Expression(Located<'t>),
    /// Statement position; wrapped as a compound statement.
    Statement(Located<'t>),
}

impl<'t> RepairableNode<'t> {
    /// Resolve and render `node` for the handler its predicate calls for.
    ///
    /// # Errors
    /// Returns [`Unlocatable`] if the node has no written text of its own
    pub fn locate(
        tree: &'t CTree,
        macros: &MacroTable,
        node: Node<'t>,
        predicate: Predicate,
    ) -> Result<Self, Unlocatable> {
        let category = predicate.category();
        let resolved = resolve(tree, macros, node, category)?;
        let located = Located {
            node,
            spelling: resolved.spelling,
            span: resolved.span,
            text: render(tree.source(), &resolved.spelling),
        };
        Ok(match category {
            NodeCategory::Expression => Self::Expression(located),
            NodeCategory::Statement => Self::Statement(located),
        })
    }

    /// Location and text, whatever the handler.
    #[must_use]
    pub fn located(&self) -> &Located<'t> {
        match self {
            Self::Expression(located) | Self::Statement(located) => located,
        }
    }

    /// Text that replaces the node.
    #[must_use]
    pub fn replacement(&self) -> String {
        match self {
            Self::Expression(located) => wrap_expression(&located.span, located.text),
            Self::Statement(located) => wrap_statement(&located.span, located.text),
        }
    }
}

/// Counters for one translation unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentStats {
    /// Nodes selected by a predicate.
    pub matched: usize,
    /// Nodes wrapped and reported.
    pub instrumented: usize,
    /// Selected nodes without a written location.
    pub skipped_unlocatable: usize,
    /// Selected nodes whose span overlaps an earlier edit.
    pub skipped_overlap: usize,
}

/// Result of instrumenting one translation unit.
#[derive(Debug)]
pub struct InstrumentOutcome {
    /// The rewritten unit, ready to commit.
    pub buffer: TranslationUnitBuffer,
    /// What happened during the pass.
    pub stats: InstrumentStats,
}

/// Runs the instrumentation pass with a fixed policy.
pub struct Instrumenter<'a> {
    parser: CParser,
    policy: &'a Policy,
    predefined: &'a MacroTable,
}

impl<'a> Instrumenter<'a> {
    /// Create an instrumenter.
    ///
    /// `predefined` holds the macros defined outside the file, for example
    /// with `-D` on the command line.
    ///
    /// # Errors
    /// Returns error if the C grammar cannot be loaded
    pub fn new(policy: &'a Policy, predefined: &'a MacroTable) -> Result<Self, InstrumentError> {
        Ok(Self {
            parser: CParser::new()?,
            policy,
            predefined,
        })
    }

    /// Instrument one translation unit, reporting each instrumented node
    /// to `sink` as it is handled.
    ///
    /// # Errors
    /// Returns error if the source does not parse or the report cannot be
    /// written
    pub fn instrument<W: Write>(
        &mut self,
        source: &str,
        sink: &mut ReportSink<W>,
    ) -> Result<InstrumentOutcome, InstrumentError> {
        let tree = self.parser.parse(source)?;
        let mut macros = self.predefined.clone();
        macros.collect(&tree);

        let mut buffer = TranslationUnitBuffer::new(source);
        let mut stats = InstrumentStats::default();

        if self.policy.is_empty() {
            tracing::debug!("no defect class selected, leaving source untouched");
        }
        let cx = MatchContext {
            tree: &tree,
            macros: &macros,
        };
        for node in tree.pre_order() {
            let Some(predicate) = self.policy.first_match(node, &cx) else {
                continue;
            };
            stats.matched += 1;

            let repairable = match RepairableNode::locate(&tree, &macros, node, predicate) {
                Ok(repairable) => repairable,
                Err(reason) => {
                    tracing::debug!(kind = node.kind(), %reason, "skipping unlocatable node");
                    stats.skipped_unlocatable += 1;
                    continue;
                }
            };
            let located = repairable.located();
            let edit = Edit::with_description(
                located.spelling.start_byte,
                located.spelling.end_byte,
                repairable.replacement(),
                predicate.name(),
            );

            match buffer.replace(edit) {
                Ok(()) => {}
                Err(err @ RewriteError::OverlappingEdits { .. }) => {
                    tracing::warn!(
                        span = %located.span,
                        predicate = predicate.name(),
                        "not instrumenting node: {err}"
                    );
                    stats.skipped_overlap += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            tracing::debug!(span = %located.span, predicate = predicate.name(), "instrumented");
            sink.record(&located.span, located.text)?;
            stats.instrumented += 1;
        }

        Ok(InstrumentOutcome { buffer, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefectClassConfig;

    fn run(config: DefectClassConfig, source: &str) -> (InstrumentOutcome, String) {
        let policy = Policy::from_config(&config);
        let macros = MacroTable::new();
        let mut instrumenter = Instrumenter::new(&policy, &macros).unwrap();
        let mut sink = ReportSink::new(Vec::new());
        let outcome = instrumenter.instrument(source, &mut sink).unwrap();
        (outcome, String::from_utf8(sink.into_inner()).unwrap())
    }

    #[test]
    fn test_if_condition_rewrite_and_report() {
        let source = "void f(int x, int y) {\n  if (x > 0) { y = 1; }\n}\n";
        let config = DefectClassConfig {
            if_conditions: true,
            ..DefectClassConfig::default()
        };
        let (outcome, report) = run(config, source);

        assert_eq!(report, "2 7 2 11\nx > 0\n");
        assert_eq!(
            outcome.buffer.text(),
            "void f(int x, int y) {\n  if (({ angelix_trace(2, 7, 2, 11); x > 0; })) { y = 1; }\n}\n"
        );
        assert_eq!(outcome.stats.instrumented, 1);
    }

    #[test]
    fn test_empty_policy_leaves_source() {
        let source = "int main(void) { int a = 1; if (a) return a; return 0; }\n";
        let (outcome, report) = run(DefectClassConfig::default(), source);
        assert_eq!(outcome.buffer.text(), source);
        assert!(report.is_empty());
        assert_eq!(outcome.stats, InstrumentStats::default());
    }

    #[test]
    fn test_guarded_break_stays_in_loop() {
        let source = "void f(int n) {\n  while (n) {\n    break;\n  }\n}\n";
        let config = DefectClassConfig {
            guards: true,
            ..DefectClassConfig::default()
        };
        let (outcome, report) = run(config, source);

        assert_eq!(report, "3 5 3 9\nbreak\n");
        assert!(outcome
            .buffer
            .text()
            .contains("while (n) {\n    { angelix_trace(3, 5, 3, 9); break; };\n  }"));
    }

    #[test]
    fn test_nested_expression_inside_guard_is_skipped() {
        let source = "void f(int n) {\n  n = n - 1;\n}\n";
        let config = DefectClassConfig {
            assignments: true,
            guards: true,
            ..DefectClassConfig::default()
        };
        let (outcome, report) = run(config, source);

        assert_eq!(outcome.stats.matched, 2);
        assert_eq!(outcome.stats.instrumented, 1);
        assert_eq!(outcome.stats.skipped_overlap, 1);
        assert_eq!(report, "2 3 2 11\nn = n - 1\n");
        assert_eq!(outcome.buffer.edit_count(), 1);
    }

    #[test]
    fn test_macro_argument_is_skipped_silently() {
        let source = "#define CHECK(c) (c)\nint f(int a) {\n  CHECK(a = a + 1);\n  if (a < 0) return 2;\n  return 0;\n}\n";
        let config = DefectClassConfig {
            semfix_mode: true,
            ..DefectClassConfig::default()
        };
        let (outcome, report) = run(config, source);

        assert_eq!(report, "4 7 4 11\na < 0\n");
        assert_eq!(outcome.stats.matched, 2);
        assert_eq!(outcome.stats.skipped_unlocatable, 1);
        assert_eq!(outcome.stats.instrumented, 1);
    }

    #[test]
    fn test_locate_tags_statement() {
        let tree = CParser::new()
            .unwrap()
            .parse("void f(void) { for (;;) { continue; } }\n")
            .unwrap();
        let node = tree
            .pre_order()
            .find(|n| n.kind() == "continue_statement")
            .unwrap();
        let macros = MacroTable::new();

        let repairable =
            RepairableNode::locate(&tree, &macros, node, Predicate::InterestingStatement).unwrap();
        assert!(matches!(repairable, RepairableNode::Statement(_)));
        assert_eq!(repairable.located().text, "continue");
        assert_eq!(
            repairable.replacement(),
            "{ angelix_trace(1, 27, 1, 34); continue; }"
        );
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let policy = Policy::from_config(&DefectClassConfig::default());
        let macros = MacroTable::new();
        let mut instrumenter = Instrumenter::new(&policy, &macros).unwrap();
        let mut sink = ReportSink::new(Vec::new());
        let result = instrumenter.instrument("int f( {\n", &mut sink);
        assert!(matches!(result, Err(InstrumentError::Source(_))));
    }
}
