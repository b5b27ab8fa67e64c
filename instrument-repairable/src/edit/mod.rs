//! Edit buffer and output manager.
//!
//! Every replacement produced while instrumenting one translation unit is
//! registered with a `TranslationUnitBuffer`. Edits are addressed by
//! original byte offsets, so the order they arrive in never corrupts the
//! others. Once traversal is complete the buffer is committed according to
//! the configured `OutputMode`.

mod buffer;
mod output;

pub use buffer::{Edit, RewriteError, TranslationUnitBuffer};
pub use output::{commit, CommitError, CommitOutcome};
