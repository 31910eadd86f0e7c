//! Sans-IO token parsers for ursparse header lines.
//!
//! A header line is `<offset> <length>\n`. The parsers here look at whatever
//! bytes happen to be available and report how many of them they consumed, so
//! a caller can hand them a number split across any number of reads and get
//! the same value back as if it had arrived in one piece.
//!
//! Spaces and newlines in front of a number are skipped. A number ends at the
//! first space or newline after its digits; that delimiter is left in place
//! for the next parser.

/// Result of a single parser call on a window of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The token is complete. Holds the number of bytes consumed.
    Done(usize),
    /// The window ran out first. Every byte of it was consumed.
    NeedMore(usize),
}

impl Progress {
    #[inline]
    pub fn consumed(self) -> usize {
        match self {
            Progress::Done(n) | Progress::NeedMore(n) => n,
        }
    }
}

/// Error type for token parsing. `index` is relative to the window passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A byte that is neither a digit nor allowed whitespace.
    UnexpectedByte { byte: u8, index: usize },
    /// The digit at `index` pushed the value past `u64::MAX`.
    Overflow { index: usize },
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::UnexpectedByte { byte, index } => {
                write!(f, "unexpected `{}` at index {}", byte.escape_ascii(), index)
            }
            ParseError::Overflow { index } => write!(f, "number overflows at index {}", index),
        }
    }
}

impl core::error::Error for ParseError {}

pub type ParseResult = Result<Progress, ParseError>;

#[inline]
fn is_delimiter(byte: u8) -> bool {
    byte == b' ' || byte == b'\n'
}

/// Partially parsed unsigned integer, carried between calls to [`parse_uint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UintAccumulator {
    value: u64,
    digits: usize,
}

impl UintAccumulator {
    pub const fn new() -> Self {
        UintAccumulator {
            value: 0,
            digits: 0,
        }
    }

    /// The value folded so far.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Whether at least one digit has been seen.
    #[inline]
    pub fn started(&self) -> bool {
        self.digits > 0
    }

    pub fn reset(&mut self) {
        *self = UintAccumulator::new();
    }
}

/// Parse an unsigned decimal integer, resuming from `acc`.
///
/// Leading spaces and newlines are skipped only until the first digit has been
/// seen, across all calls for this value. Returns [`Progress::Done`] on the
/// delimiter following the digits (which is not consumed), or
/// [`Progress::NeedMore`] when the window ends first.
pub fn parse_uint(data: &[u8], acc: &mut UintAccumulator) -> ParseResult {
    let mut i = 0;

    if !acc.started() {
        while i < data.len() && is_delimiter(data[i]) {
            i += 1;
        }
    }

    while i < data.len() {
        let byte = data[i];
        match byte {
            b'0'..=b'9' => {
                acc.value = acc
                    .value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                    .ok_or(ParseError::Overflow { index: i })?;
                acc.digits += 1;
            }
            b if is_delimiter(b) => return Ok(Progress::Done(i)),
            _ => return Err(ParseError::UnexpectedByte { byte, index: i }),
        }
        i += 1;
    }

    Ok(Progress::NeedMore(i))
}

/// Parse the end of a header line: any number of spaces, then one newline.
///
/// The newline is consumed and counted.
pub fn parse_newline(data: &[u8]) -> ParseResult {
    for (i, &byte) in data.iter().enumerate() {
        match byte {
            b' ' => continue,
            b'\n' => return Ok(Progress::Done(i + 1)),
            _ => return Err(ParseError::UnexpectedByte { byte, index: i }),
        }
    }

    Ok(Progress::NeedMore(data.len()))
}
