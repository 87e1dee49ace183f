/*!
 * Tag grammar shared by the unpacker, repacker and aligner.
 *
 * Two vocabularies live here:
 * - structural markers inside the source file (`<text>` ... `</text>`), which may
 *   close on the same physical line or several lines later;
 * - index tags inside the unpacked stream (`[12]`, `[12]:MLS:`, `[12]:ML:`,
 *   `[12]:MLE:`), which record where each extracted line came from.
 *
 * Classification returns explicit variants with byte spans so callers never
 * re-run a chain of regexes in a particular order.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Opening structural marker
pub const TEXT_OPEN: &str = "<text>";

/// Closing structural marker
pub const TEXT_CLOSE: &str = "</text>";

/// Placeholder substituted for an escaped `\n` in payload text
pub const NEWLINE_PLACEHOLDER: &str = ";NEW_LINE;";

const ESCAPED_NEWLINE: &str = "\\n";

static SIMPLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<text>(.*)</text>").expect("Invalid simple span regex"));

static OPEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<text>(.*)").expect("Invalid open span regex"));

static CLOSE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.*)</text>").expect("Invalid close span regex"));

/// `[index]` optionally followed by `:MLS:`, `:ML:` or `:MLE:`, anchored at the row start
static INDEX_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+)\](?::(MLS|MLE|ML):)?").expect("Invalid index tag regex"));

/// Structural role of an extracted line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Whole span on one physical line
    Simple,
    /// Opening line of a multi-line span
    MultilineStart,
    /// Interior line of a multi-line span
    MultilineMiddle,
    /// Closing line of a multi-line span
    MultilineEnd,
}

impl Role {
    // @returns: Marker written between the index and the payload, if any
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Simple => None,
            Self::MultilineStart => Some("MLS"),
            Self::MultilineMiddle => Some("ML"),
            Self::MultilineEnd => Some("MLE"),
        }
    }

    fn from_marker(marker: Option<&str>) -> Option<Self> {
        match marker {
            None => Some(Self::Simple),
            Some("MLS") => Some(Self::MultilineStart),
            Some("ML") => Some(Self::MultilineMiddle),
            Some("MLE") => Some(Self::MultilineEnd),
            Some(_) => None,
        }
    }

    /// Render the full index tag for this role, e.g. `[4]:MLS:`
    pub fn tag(&self, index: usize) -> String {
        match self.marker() {
            Some(marker) => format!("[{}]:{}:", index, marker),
            None => format!("[{}]", index),
        }
    }

    /// Locate the replaceable payload of this role inside a source line
    ///
    /// Interior lines carry no markers, so the whole content is the payload.
    pub fn source_span(&self, content: &str) -> Option<Range<usize>> {
        match self {
            Self::Simple => simple_span(content),
            Self::MultilineStart => open_span(content),
            Self::MultilineMiddle => Some(0..content.len()),
            Self::MultilineEnd => close_span(content),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Simple => "simple",
            Self::MultilineStart => "multiline-start",
            Self::MultilineMiddle => "multiline-middle",
            Self::MultilineEnd => "multiline-end",
        };
        write!(f, "{}", name)
    }
}

/// Structural classification of one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
    /// `<text>payload</text>` on a single line
    Simple(Range<usize>),
    /// `<text>payload` with no closer on this line
    Open(Range<usize>),
    /// `payload</text>` with no opener on this line
    Close(Range<usize>),
    /// No structural marker
    Plain,
}

/// Classify a source line (terminator already removed)
pub fn classify_source_line(content: &str) -> SourceLine {
    if let Some(span) = simple_span(content) {
        SourceLine::Simple(span)
    } else if let Some(span) = open_span(content) {
        SourceLine::Open(span)
    } else if let Some(span) = close_span(content) {
        SourceLine::Close(span)
    } else {
        SourceLine::Plain
    }
}

fn capture_span(regex: &Regex, content: &str) -> Option<Range<usize>> {
    regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

/// Payload between `<text>` and `</text>` on one line
pub fn simple_span(content: &str) -> Option<Range<usize>> {
    capture_span(&SIMPLE_REGEX, content)
}

/// Payload after the opening marker
pub fn open_span(content: &str) -> Option<Range<usize>> {
    capture_span(&OPEN_REGEX, content)
}

/// Payload before the closing marker
pub fn close_span(content: &str) -> Option<Range<usize>> {
    capture_span(&CLOSE_REGEX, content)
}

/// Index tag found at the start of an unpacked row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTag {
    /// 1-based line number in the structured file
    pub index: usize,
    /// Structural role of the row
    pub role: Role,
    /// Byte offset just past the tag
    pub end: usize,
}

impl IndexTag {
    /// Payload of `row` following this tag, minus the single space delimiter
    pub fn payload<'a>(&self, row: &'a str) -> &'a str {
        let rest = &row[self.end..];
        rest.strip_prefix(' ').unwrap_or(rest)
    }
}

/// Parse the index tag at the start of a row, if it has one
///
/// An index too large for `usize` is treated as no tag at all.
pub fn parse_index_tag(row: &str) -> Option<IndexTag> {
    let caps = INDEX_TAG_REGEX.captures(row)?;
    let index = caps.get(1)?.as_str().parse::<usize>().ok()?;
    let role = Role::from_marker(caps.get(2).map(|m| m.as_str()))?;
    let end = caps.get(0)?.end();

    Some(IndexTag { index, role, end })
}

/// Split a physical line into its content and its terminator (`\r\n`, `\n` or nothing)
pub fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

/// Replace every escaped `\n` with the placeholder so translators leave it alone
pub fn escape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, &format!("{} ", NEWLINE_PLACEHOLDER))
}

/// Reverse of [`escape_newlines`]; also accepts a placeholder whose trailing space was lost
pub fn unescape_newlines(text: &str) -> String {
    text.replace(&format!("{} ", NEWLINE_PLACEHOLDER), ESCAPED_NEWLINE)
        .replace(NEWLINE_PLACEHOLDER, ESCAPED_NEWLINE)
}

/// Whether `text` comes back unchanged from escaping and unescaping
///
/// Fails for text that already holds the placeholder, or a prefix of it that
/// an escaped newline would complete.
pub fn escapes_losslessly(text: &str) -> bool {
    unescape_newlines(&escape_newlines(text)) == text
}
