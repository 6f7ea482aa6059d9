//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `obsws` binary)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::DEFAULT_PORT;
use crate::transport::connection_url;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Default config file location (`<config dir>/obsws/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("obsws").join("config.toml"))
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        Self::default().apply(ConnectionOverrides::from_env())
    }

    /// Layer overrides on top of this config. Every field the overrides
    /// set wins, including values equal to the defaults.
    pub fn apply(mut self, overrides: ConnectionOverrides) -> Self {
        let conn = &mut self.connection;
        if let Some(host) = overrides.host {
            conn.host = host;
        }
        if let Some(port) = overrides.port {
            conn.port = port;
        }
        if let Some(password) = overrides.password {
            conn.password = password;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            conn.timeout_secs = Some(timeout_secs);
        }
        if let Some(confirm_auth) = overrides.confirm_auth {
            conn.confirm_auth = confirm_auth;
        }
        self
    }
}

/// Connection settings from a layer above the config file (environment,
/// command line). `None` leaves the lower layer untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    /// Host override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Password override (`Some("")` clears a configured password)
    pub password: Option<String>,
    /// Deadline override in seconds
    pub timeout_secs: Option<u64>,
    /// Confirmation override
    pub confirm_auth: Option<bool>,
}

impl ConnectionOverrides {
    /// Read `OBS_WS_HOST`, `OBS_WS_PORT`, `OBS_WS_PASSWORD`,
    /// `OBS_WS_TIMEOUT` and `OBS_WS_CONFIRM`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unparsable values are logged and
    /// skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("OBS_WS_HOST"),
            port: parse_var(&lookup, "OBS_WS_PORT"),
            password: lookup("OBS_WS_PASSWORD"),
            timeout_secs: parse_var(&lookup, "OBS_WS_TIMEOUT"),
            confirm_auth: parse_var(&lookup, "OBS_WS_CONFIRM"),
        }
    }
}

impl std::fmt::Debug for ConnectionOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOverrides")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("confirm_auth", &self.confirm_auth)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {}: cannot parse {:?}", key, raw);
            None
        },
    }
}

/// Connection configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host running obs-websocket
    pub host: String,

    /// Port obs-websocket listens on
    pub port: u16,

    /// Shared password (empty when the server has auth disabled)
    pub password: String,

    /// Deadline for open + handshake in seconds (none by default)
    pub timeout_secs: Option<u64>,

    /// Wait for the server to acknowledge `Authenticate`
    pub confirm_auth: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
            timeout_secs: None,
            confirm_auth: false,
        }
    }
}

impl ConnectionConfig {
    /// Get the connection URL
    pub fn url(&self) -> String {
        connection_url(&self.host, self.port)
    }

    /// Deadline as a [`Duration`]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let password = if self.password.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &password)
            .field("timeout_secs", &self.timeout_secs)
            .field("confirm_auth", &self.confirm_auth)
            .finish()
    }
}
