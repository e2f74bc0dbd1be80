//! Error types for context operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}

/// Errors while loading a spell book
#[derive(Debug, Error)]
pub enum SpellBookError {
    #[error("failed to read spell book {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid spell book {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
