use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("line `{line}` does not match `{pattern}`")]
    LineFormat { pattern: String, line: String },
    #[error("unknown candidate host type: {0}")]
    UnknownHostType(String),
    #[error("unknown media type: {0}")]
    UnknownMediaType(String),
    #[error("no {record} record for `{key}`")]
    MissingRecord { record: RecordKind, key: String },
    #[error("unrecognized attribute: {0}")]
    UnrecognizedAttribute(String),
    #[error("parse int: {0}")]
    NumericParse(#[from] ParseIntError),
    #[error("sdp: unsupported protocol version {0}")]
    InvalidVersion(String),
    #[error("sdp: empty session description")]
    EmptyDescription,
    #[error("{0}")]
    Decode(DecodeErrors),
}

impl Error {
    pub(crate) fn line_format(pattern: &str, line: &str) -> Self {
        Error::LineFormat {
            pattern: pattern.to_owned(),
            line: line.to_owned(),
        }
    }

    pub(crate) fn missing_record(record: RecordKind, key: &str) -> Self {
        Error::MissingRecord {
            record,
            key: key.to_owned(),
        }
    }
}

/// RecordKind names the keyed table a line referred to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Ssrc,
    PayloadType,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Ssrc => "ssrc",
            RecordKind::PayloadType => "payload type",
        };
        write!(f, "{s}")
    }
}

/// LineError is a single non-fatal failure recorded while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based physical line number within the decoded document.
    pub line_number: usize,
    pub text: String,
    pub error: Error,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.error, self.text)
    }
}

/// DecodeErrors aggregates every line failure of one decode pass, in the
/// order they were encountered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeErrors(pub Vec<LineError>);

impl DecodeErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineError> {
        self.0.iter()
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sdp: {} line error(s)", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl From<Vec<LineError>> for DecodeErrors {
    fn from(errors: Vec<LineError>) -> Self {
        DecodeErrors(errors)
    }
}
