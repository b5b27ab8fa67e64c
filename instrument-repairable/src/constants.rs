//! Shared constants: environment switches, file names and C vocabulary.

/// Name of the externally linked runtime function injected before every
/// instrumented location.
pub const TRACE_FUNCTION: &str = "angelix_trace";

/// Selects the two-predicate semfix policy, overriding all other switches.
pub const ENV_SEMFIX_MODE: &str = "ANGELIX_SEMFIX_MODE";
/// Activates the if-condition defect class.
pub const ENV_IF_CONDITIONS: &str = "ANGELIX_IF_CONDITIONS_DEFECT_CLASS";
/// Activates the loop-condition defect class.
pub const ENV_LOOP_CONDITIONS: &str = "ANGELIX_LOOP_CONDITIONS_DEFECT_CLASS";
/// Activates the assignment defect class.
pub const ENV_ASSIGNMENTS: &str = "ANGELIX_ASSIGNMENTS_DEFECT_CLASS";
/// Activates the guard (statement) defect class.
pub const ENV_GUARDS: &str = "ANGELIX_GUARDS_DEFECT_CLASS";
/// Switches expression defect classes to their non-trivial variants.
pub const ENV_IGNORE_TRIVIAL: &str = "ANGELIX_IGNORE_TRIVIAL";

/// Configuration file looked up from the first source upwards.
pub const CONFIG_FILENAME: &str = ".instrument-repairable.toml";

/// Build database file read when `--build-path` is given.
pub const COMPILE_COMMANDS_FILENAME: &str = "compile_commands.json";

/// File extensions picked up when a directory is passed on the command line.
pub const SOURCE_EXTENSIONS: &[&str] = &["c"];

/// Binary operators allowed inside a repairable expression.
pub const REPAIRABLE_BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "<<", ">>", "&", "|", "^", "&&", "||", "==", "!=", "<", "<=", ">",
    ">=",
];

/// Unary operators allowed inside a repairable expression.
pub const REPAIRABLE_UNARY_OPERATORS: &[&str] = &["!", "-", "+", "~"];

/// Type names (builtin or typedef) that denote an integer type.
pub const INTEGER_TYPE_NAMES: &[&str] = &[
    "char",
    "short",
    "int",
    "long",
    "bool",
    "_Bool",
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "off_t",
    "pid_t",
];
