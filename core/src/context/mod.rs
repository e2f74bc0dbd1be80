mod config;
mod error;
mod interner;
mod log_files;

pub use config::{
    DEFAULT_CRIT_WINDOW_SECS, DEFAULT_MAX_NAME_LENGTH, DEFAULT_MIN_LINE_LENGTH, ParserConfig,
    ParserConfigExt,
};
pub use error::{ConfigError, SpellBookError};
pub use interner::{IStr, empty_istr, intern, intern_upper, interner, resolve};
pub use log_files::{parse_log_filename, player_from_path};
