use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::screening::ScreeningConfig;

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
    pub screening: ScreeningConfig,
    pub inference: InferenceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let screening = ScreeningConfig {
            batch_size: read_positive("SCREENING_BATCH_SIZE", 10)? as usize,
            max_in_flight: read_positive("SCREENING_MAX_IN_FLIGHT", 5)? as usize,
            max_attempts: read_positive("SCREENING_MAX_ATTEMPTS", 2)? as u32,
        };

        let inference = InferenceConfig {
            endpoint: env::var("INFERENCE_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:8188/v1/score".to_string()),
            api_key: env::var("INFERENCE_API_KEY").unwrap_or_default(),
            model: env::var("INFERENCE_MODEL").unwrap_or_else(|_| "screening-large-v2".to_string()),
            timeout_secs: read_positive("INFERENCE_TIMEOUT_SECS", 30)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening,
            inference,
        })
    }
}

fn read_positive(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = match env::var(var) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidPositiveInt { var }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the hosted inference endpoint.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPositiveInt { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPositiveInt { var } => {
                write!(f, "{var} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPositiveInt { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
