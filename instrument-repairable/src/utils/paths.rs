//! Path utilities: display normalisation and C source discovery.

use std::path::{Path, PathBuf};

use crate::constants::SOURCE_EXTENSIONS;

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes
/// - Strips a leading "./" prefix
///
/// # Examples
/// ```
/// use std::path::Path;
/// use instrument_repairable::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\main.c")), "src/main.c");
/// assert_eq!(normalize_display_path(Path::new("./lib/util.c")), "lib/util.c");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Expand the source arguments of a run into translation units.
///
/// Files are kept as given, in order. A directory contributes every C
/// source below it, honouring `.gitignore`, sorted for a stable order.
#[must_use]
pub fn collect_sources(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }

        let walker = ignore::WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .build();
        let mut found: Vec<PathBuf> = walker
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
            })
            .collect();
        found.sort();
        sources.extend(found);
    }
    sources
}
