//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of endpoint settings (the store itself is untyped)
//! - Reject endpoints that are not absolute http(s) URLs
//! - Resolve the API listen setting into a socket address
//!
//! # Design Decisions
//! - Each check reports the key it failed on
//! - Runs when subsystems are constructed, after bootstrap

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::store::Config;

/// A single semantic problem with a config value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{key}: invalid URL {value:?}: {reason}")]
    InvalidUrl {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{key}: unsupported scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme { key: String, scheme: String },

    #[error("{key}: invalid listen address {value:?}")]
    InvalidListen { key: String, value: String },
}

/// Parse the value of `key` as an http(s) endpoint.
pub fn endpoint(config: &Config, key: &str) -> Result<Url, ValidationError> {
    let value = config.get_string(key);
    let url = Url::parse(&value).map_err(|e| ValidationError::InvalidUrl {
        key: key.to_string(),
        value: value.clone(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::UnsupportedScheme {
            key: key.to_string(),
            scheme: other.to_string(),
        }),
    }
}

/// Resolve a listen setting: a bare port binds every interface, anything
/// else must be a full socket address.
pub fn listen_address(config: &Config, key: &str) -> Result<SocketAddr, ValidationError> {
    let value = config.get_string(key);
    let value = value.trim();
    let invalid = || ValidationError::InvalidListen {
        key: key.to_string(),
        value: value.to_string(),
    };

    let value = value.strip_prefix(':').unwrap_or(value);
    if let Ok(port) = value.parse::<u16>() {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    value.parse().map_err(|_| invalid())
}
