//! Domain models for selections, remotes, and resolved links.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A configured remote and the URL it fetches from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, fetch_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fetch_url: fetch_url.into(),
        }
    }
}

/// Host, owner and repository name derived from a remote's fetch URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCoordinates {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

/// A 1-based inclusive span of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Build a range, ordering the bounds and clamping both to line 1.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end).max(1),
            end: start.max(end).max(1),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }

    /// GitHub line anchor without the leading `#`, e.g. `L5` or `L5-L8`.
    pub fn anchor(&self) -> String {
        if self.is_single_line() {
            format!("L{}", self.start)
        } else {
            format!("L{}-L{}", self.start, self.end)
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Error returned when parsing a [`LineRange`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LineRangeParseError {
    #[error("invalid line number '{0}'")]
    InvalidLine(String),
    #[error("line numbers start at 1")]
    ZeroLine,
}

impl FromStr for LineRange {
    type Err = LineRangeParseError;

    /// Accepts `N`, `N-M`, `N:M` and the anchor form `LN-LM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().trim_start_matches('#');
        let (start, end) = match value.split_once(['-', ':']) {
            Some((start, end)) => (start, end),
            None => (value, value),
        };
        let start = parse_line(start)?;
        let end = parse_line(end)?;
        Ok(Self::new(start, end))
    }
}

fn parse_line(raw: &str) -> Result<usize, LineRangeParseError> {
    let digits = raw.trim().trim_start_matches(['L', 'l']);
    let line: usize = digits
        .parse()
        .map_err(|_| LineRangeParseError::InvalidLine(raw.trim().to_string()))?;
    if line == 0 {
        return Err(LineRangeParseError::ZeroLine);
    }
    Ok(line)
}

/// The live-buffer selection: where it sits and the text it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub range: LineRange,
    /// Selected text with leading and trailing whitespace removed.
    pub snippet: String,
    /// Blank lines trimmed off above the snippet.
    pub leading_blank: usize,
    /// Blank lines trimmed off below the snippet.
    pub trailing_blank: usize,
}

impl Selection {
    /// Build a selection from explicit text. Returns `None` when the text is blank.
    pub fn from_text(range: LineRange, text: &str) -> Option<Self> {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(range, &lines)
    }

    /// Cut whole lines `range` out of `buffer`.
    ///
    /// Returns `Err(line_count)` when the range runs past the end of the buffer and `Ok(None)`
    /// when the covered lines are blank.
    pub fn from_buffer(range: LineRange, buffer: &str) -> Result<Option<Self>, usize> {
        let lines: Vec<&str> = buffer.lines().collect();
        if range.end > lines.len() {
            return Err(lines.len());
        }
        Ok(Self::from_lines(
            range,
            &lines[range.start.saturating_sub(1)..range.end],
        ))
    }

    fn from_lines(range: LineRange, lines: &[&str]) -> Option<Self> {
        let text = lines.join("\n");
        let snippet = text.trim();
        if snippet.is_empty() {
            return None;
        }
        let blank = |line: &&&str| line.trim().is_empty();
        Some(Self {
            range,
            snippet: snippet.to_string(),
            leading_blank: lines.iter().take_while(blank).count(),
            trailing_blank: lines.iter().rev().take_while(blank).count(),
        })
    }
}

/// Fully resolved location a link points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub coordinates: RepositoryCoordinates,
    pub commit: String,
    /// Repository-relative path with `/` separators.
    pub path: String,
    pub range: Option<LineRange>,
}
