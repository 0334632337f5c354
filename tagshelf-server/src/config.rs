//! Catalog configuration - environment loading
//!
//! Configuration is loaded from environment variables:
//! - `APP_ENV`: `production` disables `.env` loading (default: development)
//! - `DATABASE_URL`: SQLite URL (default: `sqlite://~/.tagshelf/catalog.db`)
//! - `HOST_ADDRESS` / `HOST_PORT`: bind address (default: 127.0.0.1:3030)
//! - `HEALTH_CHECK_SECS`: store ping interval (default: 60)
//! - `FRONTEND_DIR`: static frontend to serve, if any
//! - `CORS_PERMISSIVE`: allow any origin (default: false)
//!
//! Missing values are logged as warnings and fall back to defaults.
//! Values that are present but unparseable are errors.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_HEALTH_CHECK_SECS: u64 = 60;

/// Variables the catalog expects to find set
const EXPECTED_VARS: [&str; 4] = ["APP_ENV", "DATABASE_URL", "HOST_ADDRESS", "HOST_PORT"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub app_env: AppEnv,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub health_check_interval: Duration,
    pub frontend_dir: Option<PathBuf>,
    pub cors_permissive: bool,
}

impl CatalogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for var in missing_vars(&get) {
            tracing::warn!(var, "environment variable not set, using default");
        }

        let host = match get("HOST_ADDRESS") {
            Some(v) => v.trim().parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                var: "HOST_ADDRESS",
                value: v.clone(),
            })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = parse_or("HOST_PORT", get("HOST_PORT"), DEFAULT_PORT)?;
        let health_secs = parse_or(
            "HEALTH_CHECK_SECS",
            get("HEALTH_CHECK_SECS"),
            DEFAULT_HEALTH_CHECK_SECS,
        )?;
        let cors_permissive = match get("CORS_PERMISSIVE").as_deref().map(str::trim) {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "CORS_PERMISSIVE",
                    value: other.to_owned(),
                })
            }
        };

        Ok(Self {
            app_env: get("APP_ENV").map(|v| AppEnv::parse(&v)).unwrap_or_default(),
            database_url: get("DATABASE_URL").unwrap_or_else(default_database_url),
            bind_addr: SocketAddr::new(host, port),
            health_check_interval: Duration::from_secs(health_secs.max(1)),
            frontend_dir: get("FRONTEND_DIR").map(PathBuf::from),
            cors_permissive,
        })
    }
}

/// Expected variables that are unset or empty.
fn missing_vars(get: &impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    EXPECTED_VARS
        .iter()
        .copied()
        .filter(|var| get(var).is_none())
        .collect()
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: v }),
        None => Ok(default),
    }
}

/// `sqlite://<home>/.tagshelf/catalog.db`, or a file in the working
/// directory when there is no home.
pub fn default_database_url() -> String {
    match dirs::home_dir() {
        Some(home) => format!("sqlite://{}", home.join(".tagshelf").join("catalog.db").display()),
        None => "sqlite://tagshelf.db".to_string(),
    }
}

/// File path behind a `sqlite:` URL, or `None` for in-memory databases.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
