//! Decides whether two tumor abstracts describe a single primary cancer or
//! multiple primaries, using versioned per-site rule groups.

pub mod catalog;
pub mod config;
pub mod dates;
pub mod domain;
pub mod engine;
pub mod error;
pub mod matching;
pub mod resources;
pub mod rules;
pub mod telemetry;

pub use catalog::{Catalog, Resolution};
pub use config::EngineConfig;
pub use domain::{Behavior, Laterality, PrimaryResult, Tumor, TumorInput};
pub use engine::{AppliedRule, Classification, MphEngine};
pub use error::EngineError;

use tracing::info;

/// Loads configuration from the environment, installs the tracing subscriber
/// and builds an engine.
pub fn bootstrap() -> Result<MphEngine, EngineError> {
    let config = EngineConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let engine = MphEngine::new(&config)?;
    info!(
        environment = ?config.environment,
        groups = engine.catalog().groups().len(),
        "multiple primary engine ready"
    );
    Ok(engine)
}
