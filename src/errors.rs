//! Error types for the converter.
//!
//! Every variant is fatal for the document being converted. The batch driver
//! reports the failure and moves on to the next file.

use thiserror::Error;

/// Errors that can occur while converting a single document.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading or writing a file failed.
    #[error("failed to access {path}: {message}")]
    Load { path: String, message: String },

    /// A `T`, `A` or `R` record does not have the expected shape.
    #[error("annotation line {line}: {message}")]
    Format { line: usize, message: String },

    /// A line of the POS to UD table could not be parsed.
    #[error("ud table line {line}: {message}")]
    UdTable { line: usize, message: String },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {message}")]
    Config { path: String, message: String },

    /// A token span matched no token of the text (abort policy).
    #[error("annotation line {line}: span {start}..{end} of {id} matches no token ({context})")]
    UnresolvedSpan {
        line: usize,
        id: String,
        start: usize,
        end: usize,
        context: String,
    },

    /// An attribute or relation points at an id that has no token record.
    #[error("annotation line {line}: {id} references unknown token {target}")]
    MissingTarget {
        line: usize,
        id: String,
        target: String,
    },

    /// Two token records resolved to the same position.
    #[error("{id} and {other} both resolve to sentence {sentence}, token {token}")]
    DuplicateCoordinate {
        id: String,
        other: String,
        sentence: usize,
        token: usize,
    },

    /// Source POS tags are expected in upper case.
    #[error("{id} has non upper-case POS tag '{pos}'")]
    LowercasePos { id: String, pos: String },

    /// The POS tag has no entry in the UD table.
    #[error("{id} has POS tag '{pos}' with no UD mapping")]
    UnknownPosTag { id: String, pos: String },
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
