mod error;
mod handler;
mod line;
mod parser;
mod reader;
mod record;

pub use error::ReaderError;
pub use handler::RecordHandler;
pub use line::{ACTION_OFFSET, RawLine, TIMESTAMP_LENGTH, TokenSequence, parse_timestamp};
pub use parser::{LogParser, ModifierParser};
pub use reader::{classify_bytes, line_ranges, read_log_file};
pub use record::*;
