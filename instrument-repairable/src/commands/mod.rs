//! Commands module - CLI command implementations.

mod instrument;

pub use instrument::{run_instrument, FileSummary, InstrumentOptions, RunSummary};
