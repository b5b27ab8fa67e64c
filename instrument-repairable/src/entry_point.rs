use crate::cli::Cli;
use crate::commands::{run_instrument, InstrumentOptions};
use crate::compile_db::{extract_definitions, CompilationDatabase};
use crate::config::{Config, DefectClassConfig, OutputMode};
use crate::logging::init_tracing;
use crate::utils::collect_sources;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

/// Runs the tool with the given arguments, writing to standard output.
///
/// # Errors
///
/// Returns an error if writing help or version text fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Runs the tool with the given arguments, writing the report and the
/// streamed sources to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Fatal errors are printed to stderr and turned into exit code 1.
///
/// # Errors
///
/// Returns an error if writing help or version text fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["instrument-repairable".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    init_tracing(cli_var.verbose);

    // Config file is looked up from the first source
    let config_path = cli_var
        .sources
        .first()
        .map_or(std::path::Path::new("."), std::path::PathBuf::as_path);
    let config = Config::load_from_path(config_path);
    if let Some(path) = &config.config_file_path {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let classes = config
        .instrument
        .defect_classes()
        .merge(DefectClassConfig::from_env())
        .merge(cli_var.classes.defect_classes());
    let output = if cli_var.in_place {
        OutputMode::InPlace
    } else {
        config.instrument.output.unwrap_or_default()
    };

    let mut defines = config.instrument.defines.clone().unwrap_or_default();
    defines.extend(cli_var.defines.iter().cloned());
    defines.extend(extract_definitions(&cli_var.compiler_args));

    let compile_db = match &cli_var.build_path {
        Some(build_path) => match CompilationDatabase::load(build_path) {
            Ok(db) => Some(db),
            Err(e) => {
                eprintln!("{} {e}", "error:".red().bold());
                return Ok(1);
            }
        },
        None => None,
    };

    let sources = collect_sources(&cli_var.sources);
    if sources.is_empty() {
        tracing::warn!("no C sources found");
        return Ok(0);
    }

    let options = InstrumentOptions {
        sources,
        classes,
        output,
        defines,
        compile_db,
    };
    match run_instrument(&options, writer) {
        Ok(summary) => {
            tracing::debug!(
                files = summary.files.len(),
                instrumented = summary.instrumented(),
                written = summary.written(),
                "done"
            );
            Ok(0)
        }
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            Ok(1)
        }
    }
}
