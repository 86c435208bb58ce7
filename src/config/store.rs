//! Layered key/value configuration store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::loader::{self, ConfigError};
use crate::config::value::ConfigValue;

/// A command line flag bound to a configuration key.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagValue {
    /// The flag's value, either user supplied or the flag's own default.
    pub value: ConfigValue,
    /// Whether the user explicitly set the flag on the command line.
    pub changed: bool,
}

impl FlagValue {
    /// A flag the user set explicitly.
    pub fn set(value: impl Into<ConfigValue>) -> Self {
        Self {
            value: value.into(),
            changed: true,
        }
    }

    /// A flag left at its default.
    pub fn unset(default: impl Into<ConfigValue>) -> Self {
        Self {
            value: default.into(),
            changed: false,
        }
    }
}

/// Process configuration merged from flags, the config file and defaults.
///
/// Populated during bootstrap through `&mut self`, then shared read-only
/// behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    name: String,
    search_paths: Vec<PathBuf>,
    used_file: Option<PathBuf>,
    flags: HashMap<String, FlagValue>,
    file: HashMap<String, ConfigValue>,
    defaults: HashMap<String, ConfigValue>,
}

impl Config {
    /// Create an empty store that will look for `<name>.toml`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a directory to the search list. `$HOME` and `~` are expanded.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let expanded = match path.to_str() {
            Some(s) => loader::expand_home(s),
            None => path.to_path_buf(),
        };
        self.search_paths.push(expanded);
    }

    /// The directories searched by [`Config::read_in_config`], in order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The config file that was read, if any.
    pub fn config_file_used(&self) -> Option<&Path> {
        self.used_file.as_deref()
    }

    /// Read the first config file found on the search paths.
    ///
    /// File values replace any previously read file values.
    pub fn read_in_config(&mut self) -> Result<(), ConfigError> {
        let path = loader::find_config_file(&self.name, &self.search_paths).ok_or_else(|| {
            ConfigError::NotFound {
                name: self.name.clone(),
                searched: self.search_paths.clone(),
            }
        })?;

        self.file = loader::load_file(&path)?;
        tracing::debug!(path = %path.display(), keys = self.file.len(), "Config file loaded");
        self.used_file = Some(path);
        Ok(())
    }

    /// Bind a command line flag to `key`.
    pub fn bind_flag(&mut self, key: &str, flag: FlagValue) {
        self.flags.insert(key.to_lowercase(), flag);
    }

    /// Set the fallback used when neither an explicit flag nor the file
    /// supplies `key`.
    pub fn set_default(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.defaults.insert(key.to_lowercase(), value.into());
    }

    /// Resolve `key` through every tier.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        let key = key.to_lowercase();
        let flag = self.flags.get(&key);

        if let Some(flag) = flag.filter(|f| f.changed) {
            return Some(&flag.value);
        }
        self.file
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .or_else(|| flag.map(|f| &f.value))
    }

    /// Whether any tier supplies `key`.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value of `key`, or `""` when unset.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(ConfigValue::as_string).unwrap_or_default()
    }

    /// Integer value of `key`, or `0` when unset or unparsable.
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).map(ConfigValue::as_int).unwrap_or(0)
    }

    /// Boolean value of `key`, or `false` when unset or unparsable.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).map(ConfigValue::as_bool).unwrap_or(false)
    }

    /// Duration value of `key`, or zero when unset or unparsable.
    pub fn get_duration(&self, key: &str) -> Duration {
        self.get(key)
            .map(ConfigValue::as_duration)
            .unwrap_or(Duration::ZERO)
    }
}
