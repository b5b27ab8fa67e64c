//! Main binary entry point for `instrument-repairable`.
//!
//! Delegates to the shared `entry_point::run_with_args()` function.

use anyhow::Result;
use instrument_repairable::entry_point;

fn main() -> Result<()> {
    let code = entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
