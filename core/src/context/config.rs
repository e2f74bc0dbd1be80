//! Parser configuration
//!
//! This module re-exports the shared config type from eqlog-types and provides
//! persistence for it.

pub use eqlog_types::{
    DEFAULT_CRIT_WINDOW_SECS, DEFAULT_MAX_NAME_LENGTH, DEFAULT_MIN_LINE_LENGTH, ParserConfig,
};

use super::error::ConfigError;

const APP_NAME: &str = "eqlog";
const CONFIG_NAME: &str = "config";

/// Extension trait for ParserConfig persistence
pub trait ParserConfigExt: Sized {
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
}

impl ParserConfigExt for ParserConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "falling back to default parser config");
            Self::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}
