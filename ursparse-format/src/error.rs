use std::fmt;
use std::sync::Arc;

use crate::record::Stage;
use crate::BlockSize;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedToken,
    TruncatedStream,
    ProtocolViolation,
    IoFailure,
    UnsupportedStorage,
    ConfigurationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::MalformedToken => "malformed token",
            ErrorKind::TruncatedStream => "truncated stream",
            ErrorKind::ProtocolViolation => "protocol violation",
            ErrorKind::IoFailure => "I/O failure",
            ErrorKind::UnsupportedStorage => "unsupported storage",
            ErrorKind::ConfigurationError => "configuration error",
        };
        f.write_str(s)
    }
}

/// Which token of a record header was being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Offset,
    Length,
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Offset => "offset",
            Token::Length => "length",
            Token::Newline => "end of header line",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("unexpected `{}` while parsing {token} at input byte {position}", .byte.escape_ascii())]
    MalformedToken {
        token: Token,
        byte: u8,
        position: u64,
    },

    #[error("{token} does not fit in 64 bits at input byte {position}")]
    NumberTooLarge { token: Token, position: u64 },

    #[error("input ended while parsing {stage} of the record at input byte {position}")]
    TruncatedStream { stage: Stage, position: u64 },

    #[error(
        "segment at offset {offset} asked to write {requested} bytes but {reported} were reported"
    )]
    ProtocolViolation {
        offset: u64,
        requested: usize,
        reported: usize,
    },

    #[error("segment at offset {offset} with length {length} reaches past the largest file offset")]
    SegmentOutOfRange { offset: u64, length: u64 },

    #[error("{context}")]
    Io {
        context: &'static str,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("{context}; hole and data queries are not available")]
    UnsupportedStorage {
        context: &'static str,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("invalid block size `{value}`; it must be a whole number of at least {}", BlockSize::MIN)]
    InvalidBlockSize { value: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedToken { .. } | Error::NumberTooLarge { .. } => ErrorKind::MalformedToken,
            Error::TruncatedStream { .. } => ErrorKind::TruncatedStream,
            Error::ProtocolViolation { .. } | Error::SegmentOutOfRange { .. } => {
                ErrorKind::ProtocolViolation
            }
            Error::Io { .. } => ErrorKind::IoFailure,
            Error::UnsupportedStorage { .. } => ErrorKind::UnsupportedStorage,
            Error::InvalidBlockSize { .. } => ErrorKind::ConfigurationError,
        }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Error::Io {
            context,
            source: Arc::new(source),
        }
    }

    pub(crate) fn unsupported(context: &'static str, source: std::io::Error) -> Self {
        Error::UnsupportedStorage {
            context,
            source: Arc::new(source),
        }
    }
}
