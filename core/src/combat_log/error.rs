//! Error types for combat log reading

use std::path::PathBuf;
use thiserror::Error;

/// Errors during log file reading operations. Individual lines never fail;
/// a line that can't be classified simply yields no record.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open log file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to memory map file {path}")]
    MemoryMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
