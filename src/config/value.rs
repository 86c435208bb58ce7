//! Typed configuration values and their coercions.

use std::fmt;
use std::time::Duration;

/// A single configuration value.
///
/// Values keep the type they were supplied with; the getters on
/// [`Config`](crate::config::Config) coerce between types on read.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Bool(bool),
    Duration(Duration),
}

impl ConfigValue {
    /// Render the value as a string. Durations use humantime notation.
    pub fn as_string(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Int(i) => i.to_string(),
            ConfigValue::Bool(b) => b.to_string(),
            ConfigValue::Duration(d) => humantime::format_duration(*d).to_string(),
        }
    }

    /// Integer view of the value, `0` when it does not parse.
    pub fn as_int(&self) -> i64 {
        match self {
            ConfigValue::String(s) => s.trim().parse().unwrap_or(0),
            ConfigValue::Int(i) => *i,
            ConfigValue::Bool(b) => i64::from(*b),
            ConfigValue::Duration(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Boolean view of the value, `false` when it does not parse.
    pub fn as_bool(&self) -> bool {
        match self {
            ConfigValue::String(s) => parse_bool(s).unwrap_or(false),
            ConfigValue::Int(i) => *i != 0,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Duration(d) => !d.is_zero(),
        }
    }

    /// Duration view of the value.
    ///
    /// Integers are whole seconds. Strings are either integers (seconds) or
    /// humantime expressions such as `5s` or `1m 30s`. Anything else is zero.
    pub fn as_duration(&self) -> Duration {
        match self {
            ConfigValue::String(s) => {
                let s = s.trim();
                match s.parse::<u64>() {
                    Ok(secs) => Duration::from_secs(secs),
                    Err(_) => humantime::parse_duration(s).unwrap_or(Duration::ZERO),
                }
            }
            ConfigValue::Int(i) => Duration::from_secs(u64::try_from(*i).unwrap_or(0)),
            ConfigValue::Bool(_) => Duration::ZERO,
            ConfigValue::Duration(d) => *d,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<Duration> for ConfigValue {
    fn from(d: Duration) -> Self {
        ConfigValue::Duration(d)
    }
}
