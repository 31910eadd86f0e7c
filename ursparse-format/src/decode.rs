//! Rebuilds a sparse file from an ursparse stream.

use std::fmt;
use std::io::{ErrorKind as IoErrorKind, Read};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::RecordParser;
use crate::sink::Sink;

/// Size of the reads issued against the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockSize(usize);

impl BlockSize {
    pub const MIN: usize = 2;
    pub const DEFAULT: BlockSize = BlockSize(4096);

    pub fn new(size: usize) -> Result<BlockSize> {
        if size < Self::MIN {
            return Err(Error::InvalidBlockSize {
                value: size.to_string(),
            });
        }
        Ok(BlockSize(size))
    }

    #[inline(always)]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        BlockSize::DEFAULT
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<BlockSize> {
        let size = s.trim().parse::<usize>().map_err(|_| Error::InvalidBlockSize {
            value: s.to_string(),
        })?;
        BlockSize::new(size)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Records applied.
    pub records: u64,
    /// Meat bytes written.
    pub meat_bytes: u64,
    /// Bytes read from the ursparse stream.
    pub input_bytes: u64,
    /// Length the output was extended to, the largest `offset + length` seen.
    pub output_len: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    block_size: BlockSize,
}

impl Decoder {
    pub fn new(block_size: BlockSize) -> Decoder {
        Decoder { block_size }
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Read `input` to its end and apply every record to `sink`.
    ///
    /// The first error aborts the decode and leaves whatever was already
    /// written in place.
    pub fn decode<R: Read, S: Sink + ?Sized>(&self, mut input: R, sink: &mut S) -> Result<DecodeStats> {
        sink.seek_hole(0)
            .map_err(|e| Error::unsupported("output is not seekable", e))?;

        let mut buf = vec![0u8; self.block_size.get()];
        let mut parser = RecordParser::new();

        loop {
            let nbytes = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("could not read from input", e)),
            };

            let mut cursor = 0;
            while cursor < nbytes {
                let step = parser.feed(&buf[cursor..nbytes], sink)?;
                debug_assert!(step.consumed() > 0, "record parser made no progress");
                cursor += step.consumed();
            }
        }

        parser.finish()?;

        let output_len = parser.end();
        sink.extend_to(output_len)
            .map_err(|e| Error::io("could not set output length", e))?;

        let stats = DecodeStats {
            records: parser.records(),
            meat_bytes: parser.meat_bytes(),
            input_bytes: parser.position(),
            output_len,
        };

        tracing::info!(
            records = stats.records,
            meat_bytes = stats.meat_bytes,
            output_len = stats.output_len,
            "decoded ursparse stream"
        );

        Ok(stats)
    }
}
