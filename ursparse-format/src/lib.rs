//! Herein lies the brains of the `ursparse` encoding.
//!
//! An ursparse stream lists only the data ("meat") of a sparse file as
//! records of the form `<offset> <length>\n` followed by `<length>` raw bytes.
//! Holes are never transmitted; they reappear when the records are written
//! back at their offsets.
//!
//! Use [encode] to turn a sparse file into a stream, and [Decoder] (or
//! [RecordParser] directly, for input that arrives piecemeal) to turn a stream
//! back into a sparse file.

mod decode;
mod encode;
mod error;
mod extent;
pub mod parse;
mod record;
mod sink;

pub use decode::{BlockSize, DecodeStats, Decoder};
pub use encode::{encode, write_header, EncodeStats};
pub use error::{Error, ErrorKind, Result, Token};
pub use extent::{extents, Extent, Extents};
pub use record::{RecordParser, Segment, Stage, Step};
pub use sink::Sink;
