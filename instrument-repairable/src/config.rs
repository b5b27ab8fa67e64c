use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILENAME, ENV_ASSIGNMENTS, ENV_GUARDS, ENV_IF_CONDITIONS, ENV_IGNORE_TRIVIAL,
    ENV_LOOP_CONDITIONS, ENV_SEMFIX_MODE,
};

/// Defect-class switches, fixed once at startup.
///
/// Each switch is "set" when its source says so; layers are merged with
/// [`DefectClassConfig::merge`], so a switch can be turned on from the
/// environment, the config file or the command line, but never turned off
/// by a later layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefectClassConfig {
    /// Two-predicate semfix policy; overrides every other switch.
    pub semfix_mode: bool,
    /// Instrument `if` conditions.
    pub if_conditions: bool,
    /// Instrument `while`, `do` and `for` conditions.
    pub loop_conditions: bool,
    /// Instrument assigned values.
    pub assignments: bool,
    /// Instrument guardable statements.
    pub guards: bool,
    /// Use the non-trivial variants of the expression classes.
    pub ignore_trivial: bool,
}

impl DefectClassConfig {
    /// Reads the `ANGELIX_*` switches from the process environment.
    ///
    /// A switch is set when its variable is present, whatever its value.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name).is_some())
    }

    /// Builds the switches from an arbitrary "is this variable set" lookup.
    #[must_use]
    pub fn from_lookup(is_set: impl Fn(&str) -> bool) -> Self {
        Self {
            semfix_mode: is_set(ENV_SEMFIX_MODE),
            if_conditions: is_set(ENV_IF_CONDITIONS),
            loop_conditions: is_set(ENV_LOOP_CONDITIONS),
            assignments: is_set(ENV_ASSIGNMENTS),
            guards: is_set(ENV_GUARDS),
            ignore_trivial: is_set(ENV_IGNORE_TRIVIAL),
        }
    }

    /// Union of two layers.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            semfix_mode: self.semfix_mode || other.semfix_mode,
            if_conditions: self.if_conditions || other.if_conditions,
            loop_conditions: self.loop_conditions || other.loop_conditions,
            assignments: self.assignments || other.assignments,
            guards: self.guards || other.guards,
            ignore_trivial: self.ignore_trivial || other.ignore_trivial,
        }
    }
}

/// How rewritten translation units leave the tool.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Write the rewritten main file to standard output.
    #[default]
    Stream,
    /// Overwrite every changed source file.
    InPlace,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[instrument]` section.
    pub instrument: InstrumentConfig,
    /// The path to the configuration file this was loaded from.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Options of the `[instrument]` section; every key is optional.
pub struct InstrumentConfig {
    /// Same as `ANGELIX_SEMFIX_MODE`.
    pub semfix_mode: Option<bool>,
    /// Same as `ANGELIX_IF_CONDITIONS_DEFECT_CLASS`.
    pub if_conditions: Option<bool>,
    /// Same as `ANGELIX_LOOP_CONDITIONS_DEFECT_CLASS`.
    pub loop_conditions: Option<bool>,
    /// Same as `ANGELIX_ASSIGNMENTS_DEFECT_CLASS`.
    pub assignments: Option<bool>,
    /// Same as `ANGELIX_GUARDS_DEFECT_CLASS`.
    pub guards: Option<bool>,
    /// Same as `ANGELIX_IGNORE_TRIVIAL`.
    pub ignore_trivial: Option<bool>,
    /// Default output mode.
    pub output: Option<OutputMode>,
    /// Extra `-D` style definitions applied to every file.
    pub defines: Option<Vec<String>>,
}

impl InstrumentConfig {
    /// Defect-class switches set by this file.
    #[must_use]
    pub fn defect_classes(&self) -> DefectClassConfig {
        DefectClassConfig {
            semfix_mode: self.semfix_mode.unwrap_or(false),
            if_conditions: self.if_conditions.unwrap_or(false),
            loop_conditions: self.loop_conditions.unwrap_or(false),
            assignments: self.assignments.unwrap_or(false),
            guards: self.guards.unwrap_or(false),
            ignore_trivial: self.ignore_trivial.unwrap_or(false),
        }
    }
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that cannot be read or parsed is skipped with a warning.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                match fs::read_to_string(&candidate)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        toml::from_str::<Config>(&content).map_err(|e| e.to_string())
                    }) {
                    Ok(mut config) => {
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                    Err(reason) => {
                        tracing::warn!(path = %candidate.display(), %reason, "ignoring config file");
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
