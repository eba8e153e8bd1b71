use chrono::Datelike;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEnvironment {
    Development,
    Test,
    Production,
}

impl EngineEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub environment: EngineEnvironment,
    pub resources: ResourceConfig,
    pub telemetry: TelemetryConfig,
    /// Year pinned for validation; the system clock is used when unset.
    pub fixed_year: Option<i32>,
}

impl EngineConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = EngineEnvironment::from_str(
            &env::var("MPH_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let directory = match env::var("MPH_RESOURCE_DIR") {
            Ok(value) if !value.trim().is_empty() => {
                let path = PathBuf::from(value.trim());
                if !path.is_dir() {
                    return Err(ConfigError::InvalidResourceDir { path });
                }
                Some(path)
            }
            _ => None,
        };

        let fixed_year = match env::var("MPH_CURRENT_YEAR") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<i32>()
                    .ok()
                    .filter(|year| *year >= 0)
                    .ok_or(ConfigError::InvalidCurrentYear { value })?,
            ),
            _ => None,
        };

        let log_level = env::var("MPH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match environment {
            EngineEnvironment::Production => LogFormat::Json,
            EngineEnvironment::Development | EngineEnvironment::Test => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            resources: ResourceConfig { directory },
            telemetry: TelemetryConfig { log_level, format },
            fixed_year,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: EngineEnvironment::Development,
            resources: ResourceConfig::default(),
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                format: LogFormat::Compact,
            },
            fixed_year: None,
        }
    }
}

/// Calendar year of the local clock.
pub fn system_year() -> i32 {
    chrono::Local::now().year()
}

/// Where lookup tables come from.
#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    /// Directory overriding the packaged CSV tables.
    pub directory: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidCurrentYear { value: String },
    InvalidResourceDir { path: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCurrentYear { value } => {
                write!(f, "MPH_CURRENT_YEAR must be a non-negative year, got '{value}'")
            }
            ConfigError::InvalidResourceDir { path } => {
                write!(
                    f,
                    "MPH_RESOURCE_DIR must name an existing directory, got '{}'",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
