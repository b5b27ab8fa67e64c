//! Core library for the `instrument-repairable` tool.
//!
//! Given C translation units, this library selects repairable expressions
//! and statements according to the configured defect classes, reports their
//! source coordinates, and rewrites the source so each selected location
//! calls `angelix_trace` before its original code runs.

#![allow(clippy::similar_names, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for reading `compile_commands.json` build databases.
pub mod compile_db;

/// Module for loading configuration (environment, config file, CLI).
pub mod config;

/// Module containing shared constants.
pub mod constants;

/// Module implementing the edit buffer and output manager.
pub mod edit;

/// Module defining the entry point logic shared by all binaries.
pub mod entry_point;

/// Module containing the instrumentation engine.
pub mod instrument;

/// Module for tracing subscriber setup.
pub mod logging;

/// Module containing the defect-class policy and node-selection predicates.
pub mod policy;

/// Module wrapping the tree-sitter C parser and source locations.
pub mod source;

/// Module containing utility functions.
pub mod utils;
