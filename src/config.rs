//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for the `google` backend
//! - `GOOGLE_SERVICE_ACCOUNT_EMAIL` - Service account the token was minted for
//! - `GOOGLE_ACCESS_TOKEN` - OAuth bearer token with the spreadsheets scope
//!
//! ## Optional
//! - `CRM_HOST` - Bind address (default: 127.0.0.1)
//! - `CRM_PORT` - Listen port (default: 8000)
//! - `CRM_BACKEND` - `google` or `memory` (default: google)
//! - `GOOGLE_SPREADSHEET_ID` - Document holding the users / products / dress tabs
//! - `CRM_WORKBOOK_PATH` - JSON workbook file for the `memory` backend
//! - `CRM_PRODUCTS_SHEET_GID` - Products tab gid (default: 544808463)
//! - `CRM_DRESSES_SHEET_GID` - Dress tab gid (default: 728077449)
//! - `CRM_LOW_STOCK_THRESHOLD` - Dashboard low-stock bound (default: 5)
//! - `CRM_STATIC_DIR` - Built frontend to serve for non-API paths
//! - `CRM_LOG_JSON` - Emit JSON log lines when set

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_SPREADSHEET_ID: &str = "1nxxd_14iDyL7xQcc15RMnvd_TtHHuki6AUCsPC-tw8w";
pub const DEFAULT_PRODUCTS_GID: i64 = 544_808_463;
pub const DEFAULT_DRESSES_GID: i64 = 728_077_449;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Google,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "sheets" => Ok(Self::Google),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend \"{other}\", expected google or memory")),
        }
    }
}

/// Google service-account access. `Debug` redacts the token.
#[derive(Clone)]
pub struct GoogleConfig {
    pub spreadsheet_id: String,
    pub service_account_email: String,
    pub access_token: SecretString,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("service_account_email", &self.service_account_email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Google(GoogleConfig),
    Memory { workbook_path: Option<PathBuf> },
}

impl StoreConfig {
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Google(_) => BackendKind::Google,
            Self::Memory { .. } => BackendKind::Memory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreConfig,
    pub products_gid: i64,
    pub dresses_gid: i64,
    pub low_stock_threshold: i64,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the process environment. `.env` is read by
    /// `main` before this is called.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse, or if the Google
    /// credentials are missing while the `google` backend is selected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or(&get, "CRM_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&get, "CRM_PORT", 8000u16)?;
        let backend = parse_or(&get, "CRM_BACKEND", BackendKind::Google)?;

        let store = match backend {
            BackendKind::Google => StoreConfig::Google(GoogleConfig {
                spreadsheet_id: get("GOOGLE_SPREADSHEET_ID")
                    .unwrap_or_else(|| DEFAULT_SPREADSHEET_ID.to_string()),
                service_account_email: required(&get, "GOOGLE_SERVICE_ACCOUNT_EMAIL")?,
                access_token: SecretString::from(required(&get, "GOOGLE_ACCESS_TOKEN")?),
            }),
            BackendKind::Memory => StoreConfig::Memory {
                workbook_path: get("CRM_WORKBOOK_PATH").map(PathBuf::from),
            },
        };

        Ok(Self {
            host,
            port,
            store,
            products_gid: parse_or(&get, "CRM_PRODUCTS_SHEET_GID", DEFAULT_PRODUCTS_GID)?,
            dresses_gid: parse_or(&get, "CRM_DRESSES_SHEET_GID", DEFAULT_DRESSES_GID)?,
            low_stock_threshold: parse_or(&get, "CRM_LOW_STOCK_THRESHOLD", 5i64)?,
            static_dir: get("CRM_STATIC_DIR").map(PathBuf::from),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Read before the rest of the config so that config errors are logged.
pub fn log_json_from_env() -> bool {
    std::env::var("CRM_LOG_JSON").is_ok_and(|v| !matches!(v.trim(), "" | "0" | "false"))
}
