//! Resumable parser for ursparse records.
//!
//! A record is a header line `<offset> <length>\n` followed by exactly
//! `<length>` bytes of meat. [`RecordParser::feed`] accepts input in windows of
//! any size, applies the record to a [`Sink`] as soon as enough of it is known
//! (seek to the offset once the header is complete, then write meat as it
//! arrives) and keeps its place between calls.

use std::fmt;

use crate::error::{Error, Result, Token};
use crate::parse::{parse_newline, parse_uint, ParseError, Progress, UintAccumulator};
use crate::sink::Sink;

/// One contiguous run of meat in the decoded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    pub offset: u64,
    pub size: u64,
}

/// Where the parser is inside the current record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Start,
    Offset,
    Size,
    Newline,
    Meat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "the start",
            Stage::Offset => "the offset",
            Stage::Size => "the length",
            Stage::Newline => "the header line",
            Stage::Meat => "the meat",
        };
        f.write_str(s)
    }
}

/// Outcome of one [`RecordParser::feed`] call. Both variants carry the number
/// of input bytes consumed by the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A record was completed; the parser is back at [`Stage::Start`].
    Complete(usize),
    /// The window was used up before the current record completed.
    Pending(usize),
}

impl Step {
    #[inline]
    pub fn consumed(self) -> usize {
        match self {
            Step::Complete(n) | Step::Pending(n) => n,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct RecordProgress {
    stage: Stage,
    segment: Segment,
    number: UintAccumulator,
}

#[derive(Debug, Clone)]
enum State {
    Active(RecordProgress),
    Failed(Error),
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    position: u64,
    records: u64,
    meat_bytes: u64,
    end: u64,
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    state: State,
    totals: Totals,
}

impl Default for RecordParser {
    fn default() -> Self {
        RecordParser::new()
    }
}

impl RecordParser {
    pub fn new() -> RecordParser {
        RecordParser {
            state: State::Active(RecordProgress::default()),
            totals: Totals::default(),
        }
    }

    /// Feed the next window of input.
    ///
    /// Consumes bytes until either a record completes or `input` is used up,
    /// whichever comes first, so callers loop until the window is drained.
    /// Once an error has been returned the parser is frozen and every later
    /// call returns that same error.
    pub fn feed<S: Sink + ?Sized>(&mut self, input: &[u8], sink: &mut S) -> Result<Step> {
        let progress = match &mut self.state {
            State::Active(progress) => progress,
            State::Failed(err) => return Err(err.clone()),
        };

        match progress.advance(input, &mut self.totals, sink) {
            Ok(step) => {
                self.totals.position += step.consumed() as u64;
                Ok(step)
            }
            Err(err) => {
                tracing::trace!(error = %err, "record parser failed");
                self.state = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Check that the input ended on a record boundary.
    ///
    /// Trailing whitespace after the last record is accepted.
    pub fn finish(&self) -> Result<()> {
        match &self.state {
            State::Failed(err) => Err(err.clone()),
            State::Active(progress) => match progress.stage {
                Stage::Start => Ok(()),
                Stage::Offset if !progress.number.started() => Ok(()),
                stage => Err(Error::TruncatedStream {
                    stage,
                    position: self.totals.position,
                }),
            },
        }
    }

    /// Current stage, or `None` once the parser has failed.
    pub fn stage(&self) -> Option<Stage> {
        match &self.state {
            State::Active(progress) => Some(progress.stage),
            State::Failed(_) => None,
        }
    }

    /// The segment being assembled. `size` counts down as meat is written.
    pub fn segment(&self) -> Option<Segment> {
        match &self.state {
            State::Active(progress) => Some(progress.segment),
            State::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Input bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.totals.position
    }

    /// Records fully applied so far.
    pub fn records(&self) -> u64 {
        self.totals.records
    }

    /// Meat bytes written so far.
    pub fn meat_bytes(&self) -> u64 {
        self.totals.meat_bytes
    }

    /// Largest `offset + length` announced by any header so far.
    pub fn end(&self) -> u64 {
        self.totals.end
    }
}

fn token_error(token: Token, err: ParseError, base: u64) -> Error {
    match err {
        ParseError::UnexpectedByte { byte, index } => Error::MalformedToken {
            token,
            byte,
            position: base + index as u64,
        },
        ParseError::Overflow { index } => Error::NumberTooLarge {
            token,
            position: base + index as u64,
        },
    }
}

impl RecordProgress {
    fn enter(&mut self, stage: Stage) {
        tracing::trace!(from = %self.stage, to = %stage, "record parser stage");
        self.stage = stage;
    }

    fn advance<S: Sink + ?Sized>(
        &mut self,
        input: &[u8],
        totals: &mut Totals,
        sink: &mut S,
    ) -> Result<Step> {
        // Bytes consumed by every stage completed during this call.
        let mut consumed = 0usize;

        loop {
            let window = &input[consumed..];
            let base = totals.position + consumed as u64;

            match self.stage {
                Stage::Start => self.enter(Stage::Offset),

                Stage::Offset => match parse_uint(window, &mut self.number) {
                    Ok(Progress::NeedMore(n)) => return Ok(Step::Pending(consumed + n)),
                    Ok(Progress::Done(n)) => {
                        consumed += n;
                        self.segment.offset = self.number.value();
                        self.number.reset();
                        self.enter(Stage::Size);
                    }
                    Err(err) => return Err(token_error(Token::Offset, err, base)),
                },

                Stage::Size => match parse_uint(window, &mut self.number) {
                    Ok(Progress::NeedMore(n)) => return Ok(Step::Pending(consumed + n)),
                    Ok(Progress::Done(n)) => {
                        consumed += n;
                        self.segment.size = self.number.value();
                        self.number.reset();
                        self.enter(Stage::Newline);
                    }
                    Err(err) => return Err(token_error(Token::Length, err, base)),
                },

                Stage::Newline => match parse_newline(window) {
                    Ok(Progress::NeedMore(n)) => return Ok(Step::Pending(consumed + n)),
                    Ok(Progress::Done(n)) => {
                        consumed += n;

                        let Segment { offset, size } = self.segment;
                        let end = offset
                            .checked_add(size)
                            .filter(|&end| end <= i64::MAX as u64)
                            .ok_or(Error::SegmentOutOfRange {
                                offset,
                                length: size,
                            })?;

                        tracing::debug!(offset, size, "processing segment");

                        sink.seek_hole(offset)
                            .map_err(|e| Error::io("could not seek output to segment", e))?;
                        totals.end = totals.end.max(end);
                        self.enter(Stage::Meat);
                    }
                    Err(err) => return Err(token_error(Token::Newline, err, base)),
                },

                Stage::Meat => {
                    let available = window.len();
                    let wanted = usize::try_from(self.segment.size)
                        .map_or(available, |remaining| remaining.min(available));

                    if wanted > 0 {
                        let written = sink
                            .write_meat(&window[..wanted])
                            .map_err(|e| Error::io("could not write meat to output", e))?;

                        if written != wanted {
                            return Err(Error::ProtocolViolation {
                                offset: self.segment.offset,
                                requested: wanted,
                                reported: written,
                            });
                        }

                        consumed += wanted;
                        self.segment.size -= wanted as u64;
                        totals.meat_bytes += wanted as u64;
                    }

                    if self.segment.size == 0 {
                        *self = RecordProgress::default();
                        tracing::trace!(stage = %self.stage, "record complete");
                        totals.records += 1;
                        return Ok(Step::Complete(consumed));
                    }

                    return Ok(Step::Pending(consumed));
                }
            }
        }
    }
}
