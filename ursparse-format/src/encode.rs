//! Emits the data extents of a sparse file as ursparse records.

use std::fs::File;
use std::io::Write;
use std::os::fd::AsRawFd;

use memmap2::MmapOptions;

use crate::error::{Error, Result};
use crate::extent::{end_of_file, Extents};

/// Upper bound for a single `copy_file_range` call or mapped window.
const COPY_CHUNK: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Data extents emitted as records.
    pub extents: u64,
    /// Meat bytes copied.
    pub meat_bytes: u64,
    /// Total bytes written, headers included.
    pub output_bytes: u64,
}

/// Write the `<offset> <length>\n` header of one record.
pub fn write_header<W: Write>(mut output: W, offset: u64, length: u64) -> Result<usize> {
    let header = format!("{} {}\n", offset, length);
    output
        .write_all(header.as_bytes())
        .map_err(|e| Error::io("could not write record header", e))?;
    Ok(header.len())
}

/// Copy `length` bytes at `offset` in `input` to the current position of `output`.
fn copy_range(input: &File, output: &File, offset: u64, length: u64) -> Result<()> {
    let mut off_in = libc::loff_t::try_from(offset).map_err(|_| Error::SegmentOutOfRange {
        offset,
        length,
    })?;
    let mut remaining = length;

    while remaining > 0 {
        let chunk = remaining.min(COPY_CHUNK) as usize;

        // SAFETY: both descriptors are borrowed from live Files and off_in
        // outlives the call. A null output offset uses the file position.
        let r = unsafe {
            libc::copy_file_range(
                input.as_raw_fd(),
                &mut off_in,
                output.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };

        if r == -1 {
            let err = std::io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(
                    libc::EXDEV | libc::EINVAL | libc::ENOSYS | libc::EOPNOTSUPP | libc::EBADF,
                ) => {
                    tracing::trace!(error = %err, "copy_file_range refused; mapping extent instead");
                    return copy_mapped(input, output, off_in as u64, remaining);
                }
                _ => return Err(Error::io("could not copy extent", err)),
            }
        }

        if r == 0 {
            return Err(Error::io(
                "could not copy extent",
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "input ended inside a data extent",
                ),
            ));
        }

        remaining -= r as u64;
    }

    Ok(())
}

fn copy_mapped(input: &File, mut output: &File, offset: u64, length: u64) -> Result<()> {
    // Touching mapped pages past the end of the file raises SIGBUS.
    if offset.saturating_add(length) > end_of_file(input)? {
        return Err(Error::io(
            "could not copy extent",
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input ended inside a data extent",
            ),
        ));
    }

    let mut done = 0;

    while done < length {
        let window = (length - done).min(COPY_CHUNK) as usize;

        // SAFETY: the map is read-only and dropped before returning. The input
        // must not be truncated underneath us while it is mapped.
        let map = unsafe {
            MmapOptions::new()
                .offset(offset + done)
                .len(window)
                .map(input)
        }
        .map_err(|e| Error::io("could not map extent", e))?;

        output
            .write_all(&map)
            .map_err(|e| Error::io("could not write extent", e))?;
        done += window as u64;
    }

    Ok(())
}

/// Encode every data extent of `input` to `output` as ursparse records.
///
/// When the file ends in a hole, a final zero-length record at the file length
/// is written so that decoding restores the full length.
pub fn encode(input: &File, output: &File) -> Result<EncodeStats> {
    let mut stats = EncodeStats::default();
    let mut data_end = 0;

    for extent in Extents::new(input)? {
        let extent = extent?;
        tracing::debug!(offset = extent.offset, length = extent.length, "processing segment");

        stats.output_bytes += write_header(output, extent.offset, extent.length)? as u64;
        copy_range(input, output, extent.offset, extent.length)?;

        stats.extents += 1;
        stats.meat_bytes += extent.length;
        stats.output_bytes += extent.length;
        data_end = extent.end();
    }

    let len = end_of_file(input)?;
    if data_end < len {
        tracing::debug!(offset = len, "trailing hole");
        stats.output_bytes += write_header(output, len, 0)? as u64;
    }

    tracing::info!(
        extents = stats.extents,
        meat_bytes = stats.meat_bytes,
        output_bytes = stats.output_bytes,
        "encoded sparse file"
    );

    Ok(stats)
}
