//! Utility functions.

mod paths;

pub use paths::{collect_sources, normalize_display_path};
