use std::fmt;

use memchr::memchr_iter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Allocation,
    Parse,
    DuplicateKey,
    TypeMismatch,
    Io,
}

/// Position of a parse failure inside the input buffer.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the
/// column counted in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let head = &input[..offset];
        let mut line = 1;
        let mut line_start = 0;
        for idx in memchr_iter(b'\n', head) {
            line += 1;
            line_start = idx + 1;
        }
        Self {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}{}", DisplayLocation(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

struct DisplayLocation<'a>(&'a Option<Location>);

impl fmt::Display for DisplayLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " at {location}"),
            None => Ok(()),
        }
    }
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn allocation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Allocation, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn duplicate_key(key: &str) -> Self {
        Self::new(ErrorKind::DuplicateKey, format!("duplicate key \"{key}\""))
    }

    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type mismatch: expected {expected}, found {actual}"),
        )
    }

    pub fn io(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("write failed: {err}"))
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// True for every structural failure reported by the parser, including
    /// repeated object keys.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, ErrorKind::Parse | ErrorKind::DuplicateKey)
    }

    pub fn offset(&self) -> Option<usize> {
        self.location.map(|location| location.offset)
    }
}
