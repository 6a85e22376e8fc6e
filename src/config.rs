//! Environment-driven configuration, resolved once at startup and passed
//! into the services explicitly.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const APP_NAME: &str = "LabTracker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@labtracker.local";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("cannot determine home directory")]
    NoHomeDir,
}

/// SMTP relay settings. Present only when `SMTP_HOST` is set; without it
/// the mail transport is disabled and report endpoints fail with a
/// delivery error.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `LABTRACKER_ADDR`, `LABTRACKER_DB`, `SMTP_HOST`, `SMTP_PORT`,
    /// `SMTP_USER`, `SMTP_PASS`, `FROM_EMAIL`. Every variable has a
    /// default except the SMTP credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr_raw = std::env::var("LABTRACKER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
        let bind_addr = addr_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "LABTRACKER_ADDR",
            value: addr_raw.clone(),
        })?;

        let database_path = match std::env::var("LABTRACKER_DB") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_database_path()?,
        };

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => {
                let port_raw =
                    std::env::var("SMTP_PORT").unwrap_or_else(|_| DEFAULT_SMTP_PORT.to_string());
                let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "SMTP_PORT",
                    value: port_raw.clone(),
                })?;
                Some(SmtpConfig {
                    host,
                    port,
                    username: std::env::var("SMTP_USER").ok(),
                    password: std::env::var("SMTP_PASS").ok(),
                    from_address: std::env::var("FROM_EMAIL")
                        .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.into()),
                })
            }
            Err(_) => None,
        };

        Ok(Self {
            bind_addr,
            database_path,
            smtp,
        })
    }
}

/// Application data directory: `<home>/LabTracker`.
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(APP_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

fn default_database_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("labtracker.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("LabTracker"));
    }

    #[test]
    fn default_database_path_under_data_dir() {
        let path = default_database_path().unwrap();
        assert!(path.starts_with(app_data_dir().unwrap()));
        assert!(path.ends_with("labtracker.db"));
    }

    #[test]
    fn default_addr_parses() {
        let addr: SocketAddr = DEFAULT_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 5000);
    }
}
