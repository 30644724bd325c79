use crate::workflows::dataset::{BatchPolicy, DataFormat, NormalizeOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
    pub display_config_path: PathBuf,
    /// Extra font directory loaded next to the system fonts for the share card.
    pub font_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let format_raw = var_or("APP_DATA_FORMAT", "csv");
        let format =
            DataFormat::parse(&format_raw).ok_or(ConfigError::InvalidDataFormat(format_raw))?;

        let delimiter = parse_delimiter(&var_or("APP_CSV_DELIMITER", ";"))?;

        let policy_raw = var_or("APP_BATCH_POLICY", "abort");
        let policy =
            BatchPolicy::parse(&policy_raw).ok_or(ConfigError::InvalidBatchPolicy(policy_raw))?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig {
                dir: PathBuf::from(var_or("APP_DATA_DIR", "./data")),
                format,
                delimiter,
                policy,
            },
            display_config_path: PathBuf::from(var_or("APP_DISPLAY_CONFIG", "./config.json")),
            font_dir: env::var("APP_FONT_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw.as_bytes() {
        [byte] => Ok(*byte),
        _ if raw == "\\t" => Ok(b'\t'),
        _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the party and thesis files live and how to read them.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub format: DataFormat,
    pub delimiter: u8,
    pub policy: BatchPolicy,
}

impl DataConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            delimiter: self.delimiter,
            policy: self.policy,
        }
    }
}

/// Presentation settings read from the display config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub colors: BTreeMap<String, String>,
    pub texts: BTreeMap<String, String>,
    pub settings: BTreeMap<String, serde_json::Value>,
    pub share: ShareConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareConfig {
    pub background: Option<String>,
    pub title: Option<String>,
    pub subtitle_prefix: Option<String>,
    pub percentage_label: Option<String>,
    pub footer_text: Option<String>,
}

impl DisplayConfig {
    /// Reads the document at `path`; a missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::DisplayUnreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::DisplayInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn color(&self, name: &str) -> &str {
        self.colors.get(name).map(String::as_str).unwrap_or("#ffffff")
    }

    /// Configured label for `key`, or the key itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.texts.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDataFormat(String),
    InvalidDelimiter(String),
    InvalidBatchPolicy(String),
    DisplayUnreadable { path: PathBuf, source: std::io::Error },
    DisplayInvalid { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDataFormat(value) => {
                write!(f, "APP_DATA_FORMAT must be 'csv' or 'json', got '{value}'")
            }
            ConfigError::InvalidDelimiter(value) => {
                write!(f, "APP_CSV_DELIMITER must be a single byte, got '{value}'")
            }
            ConfigError::InvalidBatchPolicy(value) => {
                write!(f, "APP_BATCH_POLICY must be 'abort' or 'skip', got '{value}'")
            }
            ConfigError::DisplayUnreadable { path, .. } => {
                write!(f, "unable to read display config {}", path.display())
            }
            ConfigError::DisplayInvalid { path, source } => {
                write!(f, "invalid display config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::DisplayUnreadable { source, .. } => Some(source),
            ConfigError::DisplayInvalid { source, .. } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDataFormat(_)
            | ConfigError::InvalidDelimiter(_)
            | ConfigError::InvalidBatchPolicy(_) => None,
        }
    }
}
