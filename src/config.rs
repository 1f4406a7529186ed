//! Runtime configuration loaded from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::generators::engine::{DEFAULT_CONVERSION_TIMEOUT, DEFAULT_CONVERTER};
use crate::generators::raster::{
    CertificateStyle, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, DEFAULT_NAME_Y, NAME_COLOR,
};
use crate::generators::ColumnMode;
use crate::registry::{DEFAULT_CAPACITY, DEFAULT_TTL};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub certificate_style: CertificateStyle,
    pub converter_bin: String,
    pub conversion_timeout: Duration,
    pub registry_ttl: Duration,
    pub registry_capacity: u64,
    pub column_mode: ColumnMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            upload_dir: PathBuf::from("uploads"),
            generated_dir: PathBuf::from("generated_docs"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            certificate_style: CertificateStyle::default(),
            converter_bin: DEFAULT_CONVERTER.to_string(),
            conversion_timeout: DEFAULT_CONVERSION_TIMEOUT,
            registry_ttl: DEFAULT_TTL,
            registry_capacity: DEFAULT_CAPACITY,
            column_mode: ColumnMode::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            generated_dir: get("GENERATED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.generated_dir),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            certificate_style: CertificateStyle {
                font_path: get("CERTIFICATE_FONT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_PATH)),
                font_size: parse_or(&get, "CERTIFICATE_FONT_SIZE", DEFAULT_FONT_SIZE)?,
                name_y: parse_or(&get, "CERTIFICATE_NAME_Y", DEFAULT_NAME_Y)?,
                color: NAME_COLOR,
            },
            converter_bin: get("SOFFICE_BIN").unwrap_or(defaults.converter_bin),
            conversion_timeout: Duration::from_secs(parse_or(
                &get,
                "CONVERSION_TIMEOUT_SECS",
                defaults.conversion_timeout.as_secs(),
            )?),
            registry_ttl: Duration::from_secs(parse_or(
                &get,
                "REGISTRY_TTL_SECS",
                defaults.registry_ttl.as_secs(),
            )?),
            registry_capacity: parse_or(&get, "REGISTRY_CAPACITY", defaults.registry_capacity)?,
            column_mode: parse_or(&get, "COLUMN_MODE", defaults.column_mode)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError {
                key,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
