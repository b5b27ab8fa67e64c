//! Node renderer.

use crate::source::SpellingRange;

/// Exact original text of a spelling range.
///
/// The text is reproduced byte for byte: it is both reported and embedded
/// in the replacement, so any normalisation would change the program.
#[must_use]
pub fn render<'s>(source: &'s str, range: &SpellingRange) -> &'s str {
    source
        .get(range.start_byte..range.end_byte)
        .unwrap_or_default()
}
