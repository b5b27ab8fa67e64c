//! Instrumentation rewriter: the wrappers placed around repairable code.

use crate::constants::TRACE_FUNCTION;
use crate::source::SourceSpan;

/// Call of the trace function with the four coordinates of `span`.
#[must_use]
pub fn trace_call(span: &SourceSpan) -> String {
    format!(
        "{TRACE_FUNCTION}({}, {}, {}, {})",
        span.begin_line, span.begin_column, span.end_line, span.end_column
    )
}

/// Statement-expression wrapper; its value is the value of `text`.
#[must_use]
pub fn wrap_expression(span: &SourceSpan, text: &str) -> String {
    format!("({{ {}; {text}; }})", trace_call(span))
}

/// Compound-statement wrapper, so `break`, `continue` and `return` keep
/// their targets.
#[must_use]
pub fn wrap_statement(span: &SourceSpan, text: &str) -> String {
    format!("{{ {}; {text}; }}", trace_call(span))
}
