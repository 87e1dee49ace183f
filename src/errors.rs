/*!
 * Error types for the xmlpack application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Every packing failure
 * is fatal for the file being processed; nothing here is retried or repaired.
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::packager::tag_grammar::Role;

/// Coarse classification of packing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Line or file counts differ between paired inputs
    StructuralMismatch,
    /// A line matches none of the expected tag patterns
    TagGrammar,
    /// A well-formed base tag disagrees with its anchor
    AlignmentConflict,
    /// A translated file is not named after its base file
    FilenameContract,
}

/// Errors raised by the unpacker, repacker and aligner
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// Paired files do not have the same number of non-blank lines
    #[error("Line count mismatch: {base:?} has {base_lines} lines, {anchor:?} has {anchor_lines} lines")]
    LineCountMismatch {
        base: PathBuf,
        base_lines: usize,
        anchor: PathBuf,
        anchor_lines: usize,
    },

    /// Base and anchor file sets differ in size
    #[error("File count mismatch: {base} base file(s), {anchor} anchor file(s)")]
    FileCountMismatch { base: usize, anchor: usize },

    /// A base file has no anchor sharing its root key
    #[error("No anchor file found for root '{root}' ({base:?})")]
    MissingPair { root: String, base: PathBuf },

    /// Two files in the same set map onto one root key
    #[error("Root '{root}' is shared by {first:?} and {second:?}")]
    DuplicateRoot {
        root: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A translated index points outside the base file
    #[error("Index [{index}] is outside the base file ({line_count} lines)")]
    IndexOutOfRange { index: usize, line_count: usize },

    /// The same index was seen twice in the translated stream(s)
    #[error("Index [{index}] appears more than once in the translated stream")]
    DuplicateIndex { index: usize },

    /// A translated row carries no recognisable index tag
    #[error("Invalid row format at line {line}: {row:?}")]
    InvalidRow { line: usize, row: String },

    /// A multi-line span never reached its closing marker
    #[error("Multi-line text opened at line {start} is never closed before end of file")]
    UnterminatedMultiline { start: usize },

    /// Source text already holds the newline placeholder and would not survive a round trip
    #[error("Line {index} already contains the reserved placeholder ;NEW_LINE;: {line:?}")]
    ReservedPlaceholder { index: usize, line: String },

    /// The base line at an index has no span matching the translated role
    #[error("Line {index} has no {role} span to replace: {line:?}")]
    MissingSpan {
        index: usize,
        role: Role,
        line: String,
    },

    /// The anchor line carries no index tag to compare or splice
    #[error("Anchor line {line} carries no index tag: {anchor:?}")]
    MissingAnchorTag { line: usize, anchor: String },

    /// A well-formed base tag disagrees with the anchor tag
    #[error("Alignment conflict at line {line}: base {base_tag} <-/-> anchor {anchor_tag}")]
    AlignmentConflict {
        line: usize,
        base_tag: String,
        anchor_tag: String,
    },

    /// The base line has a shape the aligner cannot repair
    #[error("Unrecoverable line {line}: base {base:?}, anchor {anchor:?}")]
    UnrecoverableLine {
        line: usize,
        base: String,
        anchor: String,
    },

    /// The translated file name does not follow the base file name
    #[error("File alignment mismatch: base {base} <-/-> {translated} (expected {expected})")]
    FilenameMismatch {
        base: String,
        translated: String,
        expected: String,
    },
}

impl PackError {
    /// Which failure family this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::LineCountMismatch { .. }
            | Self::FileCountMismatch { .. }
            | Self::MissingPair { .. }
            | Self::DuplicateRoot { .. }
            | Self::IndexOutOfRange { .. }
            | Self::DuplicateIndex { .. } => ErrorCategory::StructuralMismatch,
            Self::InvalidRow { .. }
            | Self::UnterminatedMultiline { .. }
            | Self::ReservedPlaceholder { .. }
            | Self::MissingSpan { .. }
            | Self::MissingAnchorTag { .. }
            | Self::UnrecoverableLine { .. } => ErrorCategory::TagGrammar,
            Self::AlignmentConflict { .. } => ErrorCategory::AlignmentConflict,
            Self::FilenameMismatch { .. } => ErrorCategory::FilenameContract,
        }
    }
}

/// Errors that can occur when calling a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making a request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the provider itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// Status code reported by the provider
        status_code: u16,
        /// Error message from the provider
        message: String,
    },

    /// Provider answered with nothing usable
    #[error("Empty translation returned for: {0}")]
    EmptyResponse(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from packing, repacking or aligning
    #[error("Packing error: {0}")]
    Pack(#[from] PackError),

    /// Error from a translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<PackError>() {
            Ok(pack) => Self::Pack(pack),
            Err(other) => Self::Unknown(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
