use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::server::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};
use crate::wizard::DEFAULT_AUTO_ADVANCE;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
const MAX_AUTO_ADVANCE_MS: u64 = 5_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    Bind { var: &'static str, value: String },
    #[error("{var} must be a whole number of milliseconds: {value}")]
    Delay { var: &'static str, value: String },
    #[error("{var} must be a positive whole number: {value}")]
    Count { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL: {value}")]
    Url { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    pub bind: SocketAddr,
    pub manifest_path: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub auto_advance: Duration,
    pub static_dir: Option<PathBuf>,
    pub session_idle: Duration,
    pub max_sessions: u64,
}

impl WizardConfig {
    /// Reads `GMW_*` variables, after loading `.env` when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is the normal case in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = read("GMW_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Bind {
            var: "GMW_BIND",
            value: bind_raw.clone(),
        })?;

        let auto_advance = match read("GMW_AUTO_ADVANCE_MS") {
            Some(raw) => {
                let ms: u64 = raw.parse().map_err(|_| ConfigError::Delay {
                    var: "GMW_AUTO_ADVANCE_MS",
                    value: raw.clone(),
                })?;
                Duration::from_millis(ms.min(MAX_AUTO_ADVANCE_MS))
            }
            None => DEFAULT_AUTO_ADVANCE,
        };

        let count = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            match read(var) {
                Some(raw) => match raw.parse::<u64>() {
                    Ok(n) if n > 0 => Ok(Some(n)),
                    _ => Err(ConfigError::Count { var, value: raw }),
                },
                None => Ok(None),
            }
        };
        let session_idle = count("GMW_SESSION_IDLE_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_IDLE);
        let max_sessions = count("GMW_MAX_SESSIONS")?.unwrap_or(DEFAULT_MAX_SESSIONS);

        let webhook_url = read("GMW_WEBHOOK_URL");
        if let Some(url) = &webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Url {
                    var: "GMW_WEBHOOK_URL",
                    value: url.clone(),
                });
            }
        }

        Ok(Self {
            bind,
            manifest_path: read("GMW_MANIFEST").map(PathBuf::from),
            webhook_url,
            auto_advance,
            static_dir: read("GMW_STATIC_DIR").map(PathBuf::from),
            session_idle,
            max_sessions,
        })
    }
}
