use chrono::NaiveDate;
use std::ops::Deref;

/// Length of the bracketed `[Www Mon DD HH:MM:SS YYYY]` prefix.
pub const TIMESTAMP_LENGTH: usize = 26;
/// Byte offset of the action text (after the prefix and its trailing space).
pub const ACTION_OFFSET: usize = TIMESTAMP_LENGTH + 1;

/// One log line with the timestamp split off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLine<'a> {
    pub line_number: u64,
    pub timestamp: f64,
    pub text: &'a str,
}

impl<'a> RawLine<'a> {
    /// Split a line into timestamp and action text. Lines shorter than
    /// `min_length` or without a well-formed prefix are rejected.
    pub fn parse(line_number: u64, line: &'a str, min_length: usize) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.len() < min_length.max(ACTION_OFFSET + 1) {
            return None;
        }

        let b = line.as_bytes();
        if b[0] != b'[' || b[TIMESTAMP_LENGTH - 1] != b']' || b[TIMESTAMP_LENGTH] != b' ' {
            return None;
        }

        let timestamp = parse_timestamp(line.get(1..TIMESTAMP_LENGTH - 1)?)?;
        let text = line.get(ACTION_OFFSET..)?;

        Some(Self {
            line_number,
            timestamp,
            text,
        })
    }
}

fn digits(b: &[u8]) -> Option<u32> {
    let mut value = 0u32;
    let mut seen = false;
    for &c in b {
        match c {
            b' ' if !seen => {}
            b'0'..=b'9' => {
                value = value * 10 + (c - b'0') as u32;
                seen = true;
            }
            _ => return None,
        }
    }
    seen.then_some(value)
}

fn month(b: &[u8]) -> Option<u32> {
    let m = match b {
        b"Jan" => 1,
        b"Feb" => 2,
        b"Mar" => 3,
        b"Apr" => 4,
        b"May" => 5,
        b"Jun" => 6,
        b"Jul" => 7,
        b"Aug" => 8,
        b"Sep" => 9,
        b"Oct" => 10,
        b"Nov" => 11,
        b"Dec" => 12,
        _ => return None,
    };
    Some(m)
}

// parse "Www Mon DD HH:MM:SS YYYY"
pub fn parse_timestamp(segment: &str) -> Option<f64> {
    let b = segment.as_bytes();
    if b.len() != 24
        || b[3] != b' '
        || b[7] != b' '
        || b[10] != b' '
        || b[13] != b':'
        || b[16] != b':'
        || b[19] != b' '
    {
        return None;
    }

    let month = month(&b[4..7])?;
    let day = digits(&b[8..10])?;
    let hour = digits(&b[11..13])?;
    let minute = digits(&b[14..16])?;
    let second = digits(&b[17..19])?;
    let year = digits(&b[20..24])?;

    let datetime = NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(datetime.and_utc().timestamp() as f64)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Action text split on single spaces. Empty tokens stay in place so token
/// indices line up with the words of the sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSequence<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> TokenSequence<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split(' ').collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// True if the token at `index` exists and equals `word`.
    pub fn is(&self, index: usize, word: &str) -> bool {
        self.get(index) == Some(word)
    }

    pub fn is_any(&self, index: usize, words: &[&str]) -> bool {
        self.get(index).is_some_and(|t| words.contains(&t))
    }

    /// Tokens in `start..end` joined with single spaces. Out-of-range bounds
    /// are clamped; an empty range yields an empty string.
    pub fn join(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        self.tokens[start..end].join(" ")
    }

    pub fn last_index(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    /// Index range excluding a trailing balanced parenthetical, plus the text
    /// inside it. "(Strikethrough Critical)" yields the stop index of the last
    /// sentence word and "Strikethrough Critical".
    pub fn trailing_parenthetical(&self) -> (usize, Option<String>) {
        let last = self.last_index();
        if !self.tokens[last].ends_with(')') {
            return (last, None);
        }

        for i in (1..=last).rev() {
            if self.tokens[i].starts_with('(') {
                let joined = self.join(i, last + 1);
                let inner = joined
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                    .map(str::to_string);
                return (i - 1, inner);
            }
        }
        (last, None)
    }
}

impl<'a> Deref for TokenSequence<'a> {
    type Target = [&'a str];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_line() {
        let line = "[Sun Apr 18 21:26:15 2021] Astralx crushes Sontalak for 126225 points of damage.";
        let raw = RawLine::parse(7, line, 30).unwrap();
        assert_eq!(raw.line_number, 7);
        assert_eq!(raw.text, "Astralx crushes Sontalak for 126225 points of damage.");
        assert_eq!(raw.timestamp, 1618781175.0);
    }

    #[test]
    fn test_parse_raw_line_rejects_short_and_malformed() {
        assert!(RawLine::parse(1, "", 30).is_none());
        assert!(RawLine::parse(1, "[Sun Apr 18 21:26:15 2021] Hi", 30).is_none());
        assert!(RawLine::parse(1, "Sun Apr 18 21:26:15 2021] Astralx hits a rat.", 30).is_none());
        assert!(RawLine::parse(1, "[Sun Xyz 18 21:26:15 2021] Astralx hits a rat.", 30).is_none());
        assert!(RawLine::parse(1, "[Sun Apr 18 21:26:15 2021]Astralx hits a rat..", 30).is_none());
    }

    #[test]
    fn test_parse_timestamp_strips_crlf() {
        let line = "[Mon Apr 26 21:07:21 2021] Lawlstryke has taken 216717 damage by Wisp Explosion.\r\n";
        let raw = RawLine::parse(1, line, 30).unwrap();
        assert!(raw.text.ends_with("Explosion."));
    }

    #[test]
    fn test_tokens_keep_empty_positions() {
        let tokens = TokenSequence::new("a  b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens.get(1), Some(""));
        assert_eq!(tokens.join(0, 3), "a  b");
    }

    #[test]
    fn test_trailing_parenthetical() {
        let tokens = TokenSequence::new("A crushes B for 5 points of damage. (Strikethrough Critical)");
        let (stop, inner) = tokens.trailing_parenthetical();
        assert_eq!(tokens[stop], "damage.");
        assert_eq!(inner.as_deref(), Some("Strikethrough Critical"));

        let tokens = TokenSequence::new("A crushes B for 5 points of damage.");
        assert_eq!(tokens.trailing_parenthetical(), (7, None));

        let tokens = TokenSequence::new("A lands a Crippling Blow!(5000)");
        assert_eq!(tokens.trailing_parenthetical(), (4, None));
    }
}
