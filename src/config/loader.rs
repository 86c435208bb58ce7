//! Configuration loading from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::value::ConfigValue;

/// Extension appended to the config name when searching.
pub const CONFIG_EXTENSION: &str = "toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file \"{name}\" not found in {}", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    let rendered: Vec<String> = paths.iter().map(|p| format!("{}", p.display())).collect();
    format!("[{}]", rendered.join(", "))
}

/// Expand a leading `$HOME` or `~` to the user's home directory.
///
/// Paths without either prefix, or hosts without a home directory, are
/// returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = path
        .strip_prefix("$HOME")
        .or_else(|| path.strip_prefix('~'));

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}

/// Find the first `<name>.toml` in the search paths, in order.
pub fn find_config_file(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let file_name = format!("{}.{}", name, CONFIG_EXTENSION);
    search_paths
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

/// Read a TOML file and flatten it into lower-case dotted keys.
pub fn load_file(path: &Path) -> Result<HashMap<String, ConfigValue>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = content.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut values = HashMap::new();
    flatten("", &table, &mut values);
    Ok(values)
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, ConfigValue>) {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.to_lowercase()
        } else {
            format!("{}.{}", prefix, key.to_lowercase())
        };

        let value = match value {
            toml::Value::Table(nested) => {
                flatten(&key, nested, out);
                continue;
            }
            toml::Value::String(s) => ConfigValue::String(s.clone()),
            toml::Value::Integer(i) => ConfigValue::Int(*i),
            toml::Value::Boolean(b) => ConfigValue::Bool(*b),
            toml::Value::Float(f) => ConfigValue::String(f.to_string()),
            toml::Value::Datetime(d) => ConfigValue::String(d.to_string()),
            toml::Value::Array(_) => {
                tracing::debug!(key = %key, "Ignoring array value in config file");
                continue;
            }
        };
        out.insert(key, value);
    }
}
