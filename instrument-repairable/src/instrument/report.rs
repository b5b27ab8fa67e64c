//! Reporting sink for instrumented nodes.

use std::io::{self, Write};

use crate::source::SourceSpan;

/// Writes one coordinate line and one text line per instrumented node.
///
/// Records are written as soon as they are made, in traversal order;
/// downstream tooling pairs the lines up by position.
#[derive(Debug)]
pub struct ReportSink<W: Write> {
    writer: W,
}

impl<W: Write> ReportSink<W> {
    /// Create a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Emit the record of one instrumented node.
    ///
    /// # Errors
    /// Returns error if the writer fails
    pub fn record(&mut self, span: &SourceSpan, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{span}")?;
        writeln!(self.writer, "{text}")?;
        self.writer.flush()
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_format() {
        let mut sink = ReportSink::new(Vec::new());
        let span = SourceSpan {
            begin_line: 1,
            begin_column: 5,
            end_line: 2,
            end_column: 3,
        };
        sink.record(&span, "a &&\n  b").unwrap();
        sink.record(&span, "c").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "1 5 2 3\na &&\n  b\n1 5 2 3\nc\n");
    }
}
