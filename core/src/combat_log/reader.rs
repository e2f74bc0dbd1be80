use super::error::ReaderError;
use super::parser::LogParser;
use super::record::LogEvent;
use encoding_rs::WINDOWS_1252;
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Lines classified sequentially by one worker.
const LINES_PER_CHUNK: usize = 8192;

/// Byte ranges of every non-empty line, without the newline.
pub fn line_ranges(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        ranges.push((start, bytes.len()));
    }
    ranges
}

/// Classify every line of an in-memory log. Chunks run in parallel, each with
/// its own cross-line state; the line before a chunk is classified again to
/// prime the crit marker and its record discarded. The slain queue is not
/// driven here; pass the result through [`LogParser::dispatch`].
pub fn classify_bytes(bytes: &[u8], parser: &LogParser) -> Vec<LogEvent> {
    let ranges = line_ranges(bytes);
    let line_at = |idx: usize| {
        let (start, end) = ranges[idx];
        WINDOWS_1252.decode(&bytes[start..end]).0
    };

    let chunks: Vec<Vec<LogEvent>> = (0..ranges.len())
        .step_by(LINES_PER_CHUNK)
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|first| {
            let state = parser.new_state();
            if first > 0 {
                parser.parse_line(first as u64, &line_at(first - 1), &state);
            }
            let last = (first + LINES_PER_CHUNK).min(ranges.len());
            (first..last)
                .filter_map(|idx| parser.parse_line(idx as u64 + 1, &line_at(idx), &state))
                .collect()
        })
        .collect();

    chunks.into_iter().flatten().collect()
}

/// Memory-map and classify a whole log file. Returns the events in line order
/// and the byte length read, from which a tailer would resume.
pub fn read_log_file(path: &Path, parser: &LogParser) -> Result<(Vec<LogEvent>, u64), ReaderError> {
    let file = fs::File::open(path).map_err(|source| ReaderError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    // SAFETY: the map is read-only and dropped before returning; a log being
    // appended to only grows past the mapped length.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ReaderError::MemoryMap {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = mmap.as_ref();

    let events = classify_bytes(bytes, parser);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), events = events.len(), "log file classified");
    Ok((events, bytes.len() as u64))
}
