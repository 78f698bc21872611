use std::{env, fmt, net::SocketAddr};

use super::{database_url, server_bind_address, DEFAULT_RECORD_COUNT};

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns `true` when the current environment should behave as development.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// Knobs for the synthetic record generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub record_count: u32,
    pub seed: Option<u64>,
}

impl GeneratorSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let record_count = match env::var("PLACEMENT_RECORD_COUNT") {
            Ok(raw) => parse_record_count(&raw)?,
            Err(_) => DEFAULT_RECORD_COUNT,
        };
        let seed = match env::var("PLACEMENT_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            Err(_) => None,
        };

        Ok(Self { record_count, seed })
    }
}

/// Parses a positive record count, as accepted by `PLACEMENT_RECORD_COUNT`
/// and the `generate` command line argument.
pub fn parse_record_count(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::InvalidRecordCount(raw.to_string())),
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub database_url: String,
    pub generator: GeneratorSettings,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_addr = server_bind_address().map_err(ConfigError::BindAddress)?;
        let generator = GeneratorSettings::from_env()?;

        Ok(Self {
            bind_addr,
            environment,
            database_url: database_url(),
            generator,
        })
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    BindAddress(std::net::AddrParseError),
    InvalidRecordCount(String),
    InvalidSeed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => write!(
                f,
                "APP_ENV must be one of 'development', 'production', or 'test' (got {value})"
            ),
            Self::BindAddress(err) => write!(f, "invalid APP_BIND_ADDR value: {err}"),
            Self::InvalidRecordCount(value) => write!(
                f,
                "record count must be a positive integer (got {value})"
            ),
            Self::InvalidSeed(value) => {
                write!(f, "PLACEMENT_SEED must be an unsigned integer (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
