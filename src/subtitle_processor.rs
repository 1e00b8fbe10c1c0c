use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};

use crate::errors::SubtitleError;

// @module: Caption cue model, WebVTT parsing and SRT serialization

// @const: SRT timestamp regex (hours may exceed two digits)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

// @const: WebVTT short timestamp (no hours), after dot-to-comma conversion
static SHORT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2},\d{3}$").unwrap()
});

/// Line prefix of the document header
const HEADER_KEYWORD: &str = "WEBVTT";

/// Line prefix of an annotation block
const NOTE_KEYWORD: &str = "NOTE";

/// Separator between start and end on a timing line
const TIMING_ARROW: &str = "-->";

/// One timed caption entry.
///
/// Timestamps are stored in SRT form (`HH:MM:SS,mmm`). They cannot be changed
/// after creation; only the text can be replaced, through [`Cue::with_text`].
/// The 1-based index is not stored: it is the cue's position at serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Start timestamp
    start: String,

    // @field: End timestamp
    end: String,

    // @field: Newline-joined caption lines
    text: String,
}

impl Cue {
    /// Creates a cue from already converted timestamps
    pub fn new(start: impl Into<String>, end: impl Into<String>, text: impl Into<String>) -> Self {
        Cue {
            start: start.into(),
            end: end.into(),
            text: text.into(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    // @returns: Same timings, replaced text
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Cue {
            text: text.into(),
            ..self
        }
    }

    /// Start time in milliseconds
    pub fn start_ms(&self) -> Result<u64, SubtitleError> {
        parse_timestamp(&self.start)
    }

    /// End time in milliseconds
    pub fn end_ms(&self) -> Result<u64, SubtitleError> {
        parse_timestamp(&self.end)
    }
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let caps = TIMESTAMP_REGEX.captures(timestamp.trim())
        .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;

    let field = |i: usize| -> Result<u64, SubtitleError> {
        caps[i].parse::<u64>()
            .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))
    };

    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);
    if minutes >= 60 || seconds >= 60 {
        return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

// @returns: Timestamp with hours added when WebVTT omitted them
fn widen_timestamp(timestamp: &str) -> String {
    if SHORT_TIMESTAMP_REGEX.is_match(timestamp) {
        format!("00:{}", timestamp)
    } else {
        timestamp.to_string()
    }
}

// @returns: (start, end) from a timing line, None when malformed
fn split_timing_line(line: &str) -> Option<(String, String)> {
    let converted = line.replace('.', ",");
    let parts: Vec<&str> = converted.split(TIMING_ARROW).collect();
    if parts.len() != 2 {
        return None;
    }

    let start = parts[0].trim();
    // Cue settings (align:, position:, ...) follow the end time
    let end = parts[1].split_whitespace().next().unwrap_or("");
    if start.is_empty() || end.is_empty() {
        return None;
    }

    Some((widen_timestamp(start), widen_timestamp(end)))
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with(HEADER_KEYWORD) || line.starts_with(NOTE_KEYWORD)
}

fn check_timing(cue: &Cue, line_number: usize) {
    match (cue.start_ms(), cue.end_ms()) {
        (Ok(start), Ok(end)) if end < start => {
            warn!("Cue at line {} ends before it starts: {} --> {}", line_number, cue.start, cue.end);
        },
        (Ok(_), Ok(_)) => {},
        _ => debug!("Unrecognized timestamp at line {}: {} --> {}", line_number, cue.start, cue.end),
    }
}

/// Parse a WebVTT-like document into cues, in document order.
///
/// The scan never fails: header and `NOTE` lines, cue identifiers, malformed
/// timing lines and timing lines without text are skipped. An input without
/// any usable timing line yields an empty vector.
pub fn parse_webvtt(document: &str) -> Vec<Cue> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let lines: Vec<&str> = document.lines().collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if is_skippable(line) {
            i += 1;
            continue;
        }

        if !line.contains(TIMING_ARROW) {
            // Cue identifier or body of a NOTE/STYLE block
            i += 1;
            continue;
        }

        let timing_line_number = i + 1;
        let Some((start, end)) = split_timing_line(line) else {
            debug!("Skipping malformed timing line {}: {}", timing_line_number, line);
            i += 1;
            continue;
        };
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i].trim());
            i += 1;
        }

        if text_lines.is_empty() {
            continue;
        }

        let cue = Cue::new(start, end, text_lines.join("\n"));
        check_timing(&cue, timing_line_number);
        cues.push(cue);
    }

    debug!("Parsed {} cues from {} lines", cues.len(), lines.len());
    cues
}

/// A cue paired with its SRT sequence number
pub struct SrtBlock<'a> {
    pub index: usize,
    pub cue: &'a Cue,
}

impl fmt::Display for SrtBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.cue.start, self.cue.end)?;
        writeln!(f, "{}", self.cue.text)?;
        writeln!(f)
    }
}

/// Serialize cues as an SRT document, numbering them from 1
pub fn to_srt_string(cues: &[Cue]) -> String {
    cues.iter()
        .enumerate()
        .map(|(i, cue)| SrtBlock { index: i + 1, cue }.to_string())
        .collect()
}
