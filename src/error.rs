use crate::config::ConfigError;
use crate::matching::RangeError;
use crate::resources::ResourceError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Resource(ResourceError),
    Catalog(RangeError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(err) => write!(f, "configuration error: {err}"),
            EngineError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            EngineError::Resource(err) => write!(f, "resource error: {err}"),
            EngineError::Catalog(err) => write!(f, "invalid rule group definition: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            EngineError::Telemetry(err) => Some(err),
            EngineError::Resource(err) => Some(err),
            EngineError::Catalog(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for EngineError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<ResourceError> for EngineError {
    fn from(value: ResourceError) -> Self {
        Self::Resource(value)
    }
}

impl From<RangeError> for EngineError {
    fn from(value: RangeError) -> Self {
        Self::Catalog(value)
    }
}
