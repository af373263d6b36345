use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Homeocare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "homeocare_lib=info,homeocare=info,tower_http=info"
}

/// Get the application data directory
/// ~/Homeocare/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("homeocare.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    /// Shared with the identity service that hands sessions over.
    pub identity_secret: String,
    /// Sessions idle longer than this are dropped.
    pub session_idle: Duration,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Required:
    /// - `HOMEOCARE_IDENTITY_SECRET`
    ///
    /// Optional:
    /// - `HOMEOCARE_BIND` (default `127.0.0.1:8080`)
    /// - `HOMEOCARE_DB_PATH` (default `~/Homeocare/homeocare.db`)
    /// - `HOMEOCARE_SESSION_IDLE_SECS` (default 1800)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("HOMEOCARE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "HOMEOCARE_BIND",
            reason: e.to_string(),
        })?;

        let db_path = lookup("HOMEOCARE_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let identity_secret = lookup("HOMEOCARE_IDENTITY_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("HOMEOCARE_IDENTITY_SECRET"))?;

        let session_idle = match lookup("HOMEOCARE_SESSION_IDLE_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        name: "HOMEOCARE_SESSION_IDLE_SECS",
                        reason: e.to_string(),
                    }
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "HOMEOCARE_SESSION_IDLE_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        };

        Ok(Self {
            bind,
            db_path,
            identity_secret,
            session_idle,
        })
    }
}
