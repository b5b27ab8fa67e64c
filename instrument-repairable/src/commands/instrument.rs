//! Instrument command: one pass and one commit per translation unit.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::compile_db::CompilationDatabase;
use crate::config::{DefectClassConfig, OutputMode};
use crate::edit::{commit, CommitOutcome};
use crate::instrument::{InstrumentStats, Instrumenter, ReportSink};
use crate::policy::Policy;
use crate::source::MacroTable;
use crate::utils::normalize_display_path;

/// Options for an instrumentation run
#[derive(Debug, Default)]
pub struct InstrumentOptions {
    /// Translation units, in processing order
    pub sources: Vec<PathBuf>,
    /// Merged defect-class switches
    pub classes: DefectClassConfig,
    /// Where rewritten sources go
    pub output: OutputMode,
    /// Definitions applied to every source (`NAME[=VALUE]`)
    pub defines: Vec<String>,
    /// Build database supplying per-file definitions
    pub compile_db: Option<CompilationDatabase>,
}

/// What happened to one source file
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// The source file
    pub path: PathBuf,
    /// Instrumentation counters
    pub stats: InstrumentStats,
    /// How the result was committed
    pub outcome: CommitOutcome,
}

/// Result of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Per-file results, in processing order
    pub files: Vec<FileSummary>,
}

impl RunSummary {
    /// Total number of instrumented nodes.
    #[must_use]
    pub fn instrumented(&self) -> usize {
        self.files.iter().map(|f| f.stats.instrumented).sum()
    }

    /// Number of files overwritten in place.
    #[must_use]
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome == CommitOutcome::Written)
            .count()
    }
}

/// Instrument every source of `options`, writing the report (and, in
/// stream mode, the rewritten sources) to `writer`.
///
/// Files are processed one after the other with their own edit buffer.
/// The first file that fails to read, parse or commit ends the run; files
/// committed before it keep their new contents.
///
/// # Errors
///
/// Returns an error if a source cannot be read, parsed or written.
pub fn run_instrument<W: Write>(options: &InstrumentOptions, writer: &mut W) -> Result<RunSummary> {
    let policy = Policy::from_config(&options.classes);
    let predicates: Vec<&str> = policy.predicates().iter().map(|p| p.name()).collect();
    tracing::debug!(mode = ?policy.mode(), ?predicates, "policy");

    let mut summary = RunSummary::default();
    for path in &options.sources {
        let display_path = normalize_display_path(path);
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read {display_path}"))?;

        let mut macros = MacroTable::new();
        for definition in &options.defines {
            macros.define(definition);
        }
        if let Some(db) = &options.compile_db {
            for definition in db.definitions_for(path) {
                macros.define(&definition);
            }
        }

        let mut instrumenter = Instrumenter::new(&policy, &macros)?;
        let outcome = {
            let mut sink = ReportSink::new(&mut *writer);
            instrumenter
                .instrument(&source, &mut sink)
                .with_context(|| format!("Failed to instrument {display_path}"))?
        };

        let committed = commit(&outcome.buffer, path, options.output, writer)
            .with_context(|| format!("Failed to commit {display_path}"))?;
        tracing::info!(
            file = %display_path,
            instrumented = outcome.stats.instrumented,
            skipped_unlocatable = outcome.stats.skipped_unlocatable,
            skipped_overlap = outcome.stats.skipped_overlap,
            outcome = ?committed,
            "processed"
        );

        summary.files.push(FileSummary {
            path: path.clone(),
            stats: outcome.stats,
            outcome: committed,
        });
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stream_run_interleaves_report_and_source() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.c");
        let second = dir.path().join("second.c");
        fs::write(&first, "int f(int a) { if (a) return 1; return 0; }\n").unwrap();
        fs::write(&second, "int g(void) { return 0; }\n").unwrap();

        let options = InstrumentOptions {
            sources: vec![first, second],
            classes: DefectClassConfig {
                if_conditions: true,
                ..DefectClassConfig::default()
            },
            ..InstrumentOptions::default()
        };
        let mut out = Vec::new();
        let summary = run_instrument(&options, &mut out).unwrap();

        assert_eq!(summary.instrumented(), 1);
        assert_eq!(summary.written(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1 20 1 20\na\n\
             int f(int a) { if (({ angelix_trace(1, 20, 1, 20); a; })) return 1; return 0; }\n\
             int g(void) { return 0; }\n"
        );
    }

    #[test]
    fn test_defines_mark_macro_constants() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.c");
        fs::write(&path, "int f(int a) { if (ENABLED) return a; return 0; }\n").unwrap();

        let options = InstrumentOptions {
            sources: vec![path.clone()],
            classes: DefectClassConfig {
                if_conditions: true,
                ignore_trivial: true,
                ..DefectClassConfig::default()
            },
            output: OutputMode::InPlace,
            defines: vec!["ENABLED=1".to_owned()],
            compile_db: None,
        };
        let mut out = Vec::new();
        let summary = run_instrument(&options, &mut out).unwrap();

        assert_eq!(summary.instrumented(), 0);
        assert_eq!(summary.files[0].outcome, CommitOutcome::Unchanged);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let options = InstrumentOptions {
            sources: vec![dir.path().join("absent.c")],
            ..InstrumentOptions::default()
        };
        let err = run_instrument(&options, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
