//! Build database support.
//!
//! Tree-sitter parses unexpanded text, so the only thing the instrumenter
//! needs from a build is which macros were defined on the compiler command
//! line. They are taken from `compile_commands.json` entries and from
//! compiler arguments passed after `--`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::COMPILE_COMMANDS_FILENAME;

/// One entry of a `compile_commands.json` file.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compilation.
    pub directory: PathBuf,
    /// Main source file, possibly relative to `directory`.
    pub file: PathBuf,
    /// Full command line as a single string.
    #[serde(default)]
    pub command: Option<String>,
    /// Command line already split into arguments.
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// Absolute (or directory-relative) path of the main source file.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }

    /// Compiler arguments; `arguments` wins over `command`.
    ///
    /// `command` is split with shell quoting rules. A command with
    /// unbalanced quotes yields no arguments.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match (&self.arguments, &self.command) {
            (Some(arguments), _) => arguments.clone(),
            (None, Some(command)) => shlex::split(command).unwrap_or_else(|| {
                tracing::warn!(
                    file = %self.file.display(),
                    "Ignoring compile command with unbalanced quotes"
                );
                Vec::new()
            }),
            (None, None) => Vec::new(),
        }
    }
}

/// Error raised while loading a build database.
#[derive(Debug, thiserror::Error)]
pub enum CompileDbError {
    /// The database file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Database path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The database is not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Database path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// A loaded `compile_commands.json`.
#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    entries: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Load the database from a build directory or a direct file path.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(build_path: &Path) -> Result<Self, CompileDbError> {
        let path = if build_path.is_dir() {
            build_path.join(COMPILE_COMMANDS_FILENAME)
        } else {
            build_path.to_path_buf()
        };
        let content = fs::read_to_string(&path).map_err(|source| CompileDbError::Read {
            path: path.clone(),
            source,
        })?;
        let entries = serde_json::from_str(&content)
            .map_err(|source| CompileDbError::Parse { path, source })?;
        Ok(Self { entries })
    }

    /// `-D` definitions of the first entry compiling `source`.
    #[must_use]
    pub fn definitions_for(&self, source: &Path) -> Vec<String> {
        self.entries
            .iter()
            .find(|entry| same_file(&entry.source_path(), source))
            .map(|entry| extract_definitions(&entry.args()))
            .unwrap_or_default()
    }
}

/// Collect the `-DNAME[=VALUE]` and `-D NAME[=VALUE]` definitions of a
/// compiler command line.
#[must_use]
pub fn extract_definitions(args: &[String]) -> Vec<String> {
    let mut definitions = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-D" {
            if let Some(value) = iter.next() {
                definitions.push(value.clone());
            }
        } else if let Some(value) = arg.strip_prefix("-D") {
            definitions.push(value.to_owned());
        }
    }
    definitions
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
