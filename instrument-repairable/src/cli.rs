use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::DefectClassConfig;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
ENVIRONMENT:
  ANGELIX_SEMFIX_MODE                    Same as --semfix
  ANGELIX_IF_CONDITIONS_DEFECT_CLASS     Same as --if-conditions
  ANGELIX_LOOP_CONDITIONS_DEFECT_CLASS   Same as --loop-conditions
  ANGELIX_ASSIGNMENTS_DEFECT_CLASS       Same as --assignments
  ANGELIX_GUARDS_DEFECT_CLASS            Same as --guards
  ANGELIX_IGNORE_TRIVIAL                 Same as --ignore-trivial
  A switch is on when its variable is set, whatever the value.

CONFIGURATION FILE (.instrument-repairable.toml):
  Looked up from the first source upwards.

  [instrument]
  if_conditions = true       # Defect classes, as on the command line
  loop_conditions = true
  assignments = false
  guards = false
  ignore_trivial = false
  semfix_mode = false
  output = \"stream\"          # or \"in-place\"
  defines = [\"DEBUG\"]        # Extra -D definitions for every file
";

/// Defect classes to instrument.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct DefectClassArgs {
    /// Instrument conditions and integer assignments only (overrides the other classes).
    #[arg(long)]
    pub semfix: bool,

    /// Instrument `if` conditions.
    #[arg(long)]
    pub if_conditions: bool,

    /// Instrument `while`, `do` and `for` conditions.
    #[arg(long)]
    pub loop_conditions: bool,

    /// Instrument assigned values.
    #[arg(long)]
    pub assignments: bool,

    /// Instrument guardable statements inside blocks.
    #[arg(long)]
    pub guards: bool,

    /// Skip expressions that read no variable.
    #[arg(long)]
    pub ignore_trivial: bool,
}

impl DefectClassArgs {
    /// The switches given on the command line.
    #[must_use]
    pub fn defect_classes(&self) -> DefectClassConfig {
        DefectClassConfig {
            semfix_mode: self.semfix,
            if_conditions: self.if_conditions,
            loop_conditions: self.loop_conditions,
            assignments: self.assignments,
            guards: self.guards,
            ignore_trivial: self.ignore_trivial,
        }
    }
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    name = "instrument-repairable",
    version,
    about = "Instrument repairable C expressions and statements with angelix_trace calls",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// C source files or directories to instrument.
    #[arg(required = true, value_name = "SOURCES")]
    pub sources: Vec<PathBuf>,

    /// Defect-class switches.
    #[command(flatten)]
    pub classes: DefectClassArgs,

    /// Overwrite changed sources instead of printing the rewritten file.
    #[arg(long)]
    pub in_place: bool,

    /// Directory containing compile_commands.json (or the file itself).
    #[arg(short = 'p', long, value_name = "DIR")]
    pub build_path: Option<PathBuf>,

    /// Define a macro for every source, as the compiler's -D.
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub defines: Vec<String>,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Compiler arguments; only -D definitions are used.
    #[arg(last = true, value_name = "COMPILER_ARGS", allow_hyphen_values = true)]
    pub compiler_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_and_flags() {
        let cli = Cli::try_parse_from([
            "instrument-repairable",
            "--if-conditions",
            "--guards",
            "-DDEBUG",
            "a.c",
            "b.c",
            "--",
            "-DLIMIT=3",
            "-O2",
        ])
        .unwrap();

        assert_eq!(cli.sources, vec![PathBuf::from("a.c"), PathBuf::from("b.c")]);
        assert!(cli.classes.if_conditions && cli.classes.guards);
        assert!(!cli.in_place);
        assert_eq!(cli.defines, vec!["DEBUG"]);
        assert_eq!(cli.compiler_args, vec!["-DLIMIT=3", "-O2"]);
    }

    #[test]
    fn test_sources_are_required() {
        assert!(Cli::try_parse_from(["instrument-repairable", "--guards"]).is_err());
    }

    #[test]
    fn test_defect_classes_from_args() {
        let cli =
            Cli::try_parse_from(["instrument-repairable", "--semfix", "--ignore-trivial", "x.c"])
                .unwrap();
        let classes = cli.classes.defect_classes();
        assert!(classes.semfix_mode && classes.ignore_trivial);
        assert!(!classes.guards);
    }
}
