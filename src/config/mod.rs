//! Configuration loading for the archive pipeline.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `GHDAYS_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf, time::Duration};

use chrono::Locale;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::aggregation::WeekdayNamer;
use crate::source::ArchiveHour;

const ENV_PREFIX: &str = "GHDAYS_";

/// Application configuration derived from `GHDAYS_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Directory URL that hourly partitions are joined onto
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,
    /// Partition downloaded when no input file is given, `YYYY-MM-DD-H`
    #[serde(default = "default_archive_hour")]
    pub archive_hour: String,
    /// Locale used for weekday names, e.g. `es_ES`
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Number of single-row sample documents to emit
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    /// Document store URL; empty disables persistence
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            archive_base_url: default_archive_base_url(),
            archive_hour: default_archive_hour(),
            locale: default_locale(),
            sample_size: default_sample_size(),
            http_timeout_seconds: default_http_timeout_seconds(),
            database_url: String::new(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Parsed archive base URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.archive_base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            value: self.archive_base_url.clone(),
            source,
        })
    }

    /// Parsed default archive partition.
    pub fn archive_hour(&self) -> Result<ArchiveHour, ConfigError> {
        self.archive_hour
            .parse()
            .map_err(|_| ConfigError::InvalidArchiveHour {
                value: self.archive_hour.clone(),
            })
    }

    /// Parsed weekday locale.
    pub fn locale(&self) -> Result<Locale, ConfigError> {
        Locale::try_from(self.locale.as_str()).map_err(|_| ConfigError::UnknownLocale {
            value: self.locale.clone(),
        })
    }

    pub fn weekday_namer(&self) -> Result<WeekdayNamer, ConfigError> {
        Ok(WeekdayNamer::new(self.locale()?))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Whether a document store is configured.
    pub fn persistence_enabled(&self) -> bool {
        !self.database_url.is_empty()
    }

    /// Returns a redacted JSON representation (the database URL may hold credentials).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.persistence_enabled() {
            config.database_url = "[REDACTED]".to_string();
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url()?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.archive_base_url.clone(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        self.archive_hour()?;
        self.locale()?;

        if self.http_timeout_seconds == 0 {
            return Err(ConfigError::InvalidHttpTimeout {
                value: self.http_timeout_seconds,
            });
        }

        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if self.persistence_enabled() && self.db_max_connections == 0 {
            return Err(ConfigError::InvalidDbMaxConnections);
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_archive_base_url() -> String {
    crate::source::gharchive::DEFAULT_BASE_URL.to_string()
}

fn default_archive_hour() -> String {
    "2025-01-02-15".to_string()
}

fn default_locale() -> String {
    "es_ES".to_string()
}

fn default_sample_size() -> usize {
    2
}

fn default_http_timeout_seconds() -> u64 {
    300
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid archive base url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("invalid archive hour '{value}'; expected YYYY-MM-DD-H")]
    InvalidArchiveHour { value: String },
    #[error("unknown locale '{value}'; expected a name such as es_ES or en_US")]
    UnknownLocale { value: String },
    #[error("http timeout must be positive, got {value}")]
    InvalidHttpTimeout { value: u64 },
    #[error("log format must be 'pretty' or 'json', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("database max connections must be at least 1")]
    InvalidDbMaxConnections,
}

/// Loads configuration using layered `.env` files and `GHDAYS_*` env vars.
#[derive(Debug)]
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads and validates configuration.
    ///
    /// Precedence, lowest first: `.env`, `.env.local`, `.env.<profile>`,
    /// `.env.<profile>.local`, process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let mut take = |key: &str| layered.remove(key).filter(|v| !v.is_empty());

        let config = AppConfig {
            profile: take("PROFILE").unwrap_or(profile_hint),
            log_level: take("LOG_LEVEL").unwrap_or_else(default_log_level),
            log_format: take("LOG_FORMAT").unwrap_or_else(default_log_format),
            archive_base_url: take("ARCHIVE_BASE_URL").unwrap_or_else(default_archive_base_url),
            archive_hour: take("ARCHIVE_HOUR").unwrap_or_else(default_archive_hour),
            locale: take("LOCALE").unwrap_or_else(default_locale),
            sample_size: take("SAMPLE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_sample_size),
            http_timeout_seconds: take("HTTP_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_http_timeout_seconds),
            database_url: take("DATABASE_URL").unwrap_or_default(),
            db_max_connections: take("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_db_max_connections),
            db_acquire_timeout_ms: take("DB_ACQUIRE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_db_acquire_timeout_ms),
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
