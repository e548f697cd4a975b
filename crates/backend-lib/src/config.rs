// ============================
// authgate-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::TimeDelta;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variables read without a prefix
const RAW_ENV_KEYS: [&str; 5] = [
    "AUTH_TYPE",
    "SESSION_NAME",
    "SESSION_DURATION",
    "API_HOST",
    "API_PORT",
];

/// Prefix for every other setting taken from the environment
const ENV_PREFIX: &str = "AUTHGATE_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Name of the session cookie when none is configured
pub const DEFAULT_SESSION_NAME: &str = "_my_session_id";

/// Which authentication strategy guards the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// Gate installed but nothing requires authentication
    Auth,
    BasicAuth,
    SessionAuth,
    SessionExpAuth,
    SessionDbAuth,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Auth => "auth",
            AuthType::BasicAuth => "basic_auth",
            AuthType::SessionAuth => "session_auth",
            AuthType::SessionExpAuth => "session_exp_auth",
            AuthType::SessionDbAuth => "session_db_auth",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(AuthType::Auth),
            "basic_auth" => Ok(AuthType::BasicAuth),
            "session_auth" => Ok(AuthType::SessionAuth),
            "session_exp_auth" => Ok(AuthType::SessionExpAuth),
            "session_db_auth" => Ok(AuthType::SessionDbAuth),
            other => Err(format!("unknown auth type `{other}`")),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Interface to bind
    pub api_host: String,
    /// Port to bind
    pub api_port: u16,
    /// Directory holding the `.db_<Class>.json` files
    pub data_dir: PathBuf,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Raw strategy selector, see [`Settings::auth_type`]
    #[serde(default)]
    pub auth_type: Option<String>,
    /// Session cookie name
    pub session_name: String,
    /// Session lifetime in seconds; zero, negative or non-numeric never
    /// expires
    #[serde(deserialize_with = "lenient_seconds")]
    pub session_duration: i64,
    /// Paths the request gate lets through unauthenticated
    pub excluded_paths: Vec<String>,
}

/// Whole seconds from a number or numeric text; anything else reads as 0
fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let seconds = match Raw::deserialize(deserializer)? {
        Raw::Int(seconds) => Some(seconds),
        Raw::Text(text) => text.trim().parse().ok(),
        Raw::Other(_) => None,
    };
    Ok(seconds.unwrap_or_else(|| {
        tracing::warn!("session duration is not a whole number of seconds; sessions never expire");
        0
    }))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            auth_type: None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
            session_duration: 0,
            excluded_paths: vec![
                "/api/v1/status/".to_string(),
                "/api/v1/unauthorized/".to_string(),
                "/api/v1/forbidden/".to_string(),
                "/api/v1/auth_session/login/".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from the given TOML file and the environment.
    /// A missing file is not an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::raw().only(&RAW_ENV_KEYS))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("invalid log level `{}`", self.log_level);
        }
        if self.session_name.trim().is_empty() {
            bail!("session name must not be empty");
        }
        if self.api_port == 0 {
            bail!("api port must not be zero");
        }
        Ok(())
    }

    /// The configured strategy; unknown values disable the gate
    pub fn auth_type(&self) -> Option<AuthType> {
        let raw = self.auth_type.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(kind) => Some(kind),
            Err(err) => {
                tracing::warn!("{err}; authentication disabled");
                None
            }
        }
    }

    /// Session lifetime, `None` when sessions never expire
    pub fn session_duration(&self) -> Option<TimeDelta> {
        (self.session_duration > 0).then(|| TimeDelta::seconds(self.session_duration))
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}
