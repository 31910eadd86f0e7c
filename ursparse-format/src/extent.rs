//! Data extent discovery through `SEEK_DATA` / `SEEK_HOLE`.

use std::fs::File;
use std::iter::FusedIterator;
use std::os::fd::{AsRawFd, RawFd};

use crate::error::{Error, Result};

/// A maximal run of data in a sparse file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Extent {
    pub offset: u64,
    pub length: u64,
}

impl Extent {
    /// Offset one past the last byte of the extent.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

pub(crate) fn lseek(fd: RawFd, offset: u64, whence: libc::c_int) -> std::io::Result<u64> {
    let offset = libc::off_t::try_from(offset).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "offset out of range")
    })?;

    // SAFETY: lseek only inspects the descriptor, which is borrowed from a live File.
    let r = unsafe { libc::lseek(fd, offset, whence) };
    if r == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(r as u64)
}

fn is_unsupported(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EINVAL | libc::ESPIPE | libc::EOPNOTSUPP)
    )
}

fn seek_error(context: &'static str, err: std::io::Error) -> Error {
    if is_unsupported(&err) {
        Error::unsupported(context, err)
    } else {
        Error::io(context, err)
    }
}

/// Length of `file`, queried through the descriptor so block devices work too.
pub(crate) fn end_of_file(file: &File) -> Result<u64> {
    lseek(file.as_raw_fd(), 0, libc::SEEK_END).map_err(|e| seek_error("could not find end of input", e))
}

/// Lazily walks the data extents of a file in ascending offset order.
#[derive(Debug)]
pub struct Extents<'a> {
    file: &'a File,
    cursor: u64,
    done: bool,
}

impl<'a> Extents<'a> {
    pub fn new(file: &'a File) -> Result<Extents<'a>> {
        lseek(file.as_raw_fd(), 0, libc::SEEK_SET)
            .map_err(|e| Error::unsupported("input is not seekable", e))?;

        Ok(Extents {
            file,
            cursor: 0,
            done: false,
        })
    }

    fn next_extent(&mut self) -> Result<Option<Extent>> {
        let fd = self.file.as_raw_fd();

        let start = match lseek(fd, self.cursor, libc::SEEK_DATA) {
            Ok(start) => start,
            // No data at or after the cursor.
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => return Ok(None),
            Err(e) => return Err(seek_error("could not find next data region", e)),
        };

        let end = match lseek(fd, start, libc::SEEK_HOLE) {
            Ok(end) => end,
            // Data runs up to the end of the file without a reported hole.
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => end_of_file(self.file)?,
            Err(e) => return Err(seek_error("could not find next hole", e)),
        };

        if end <= start {
            return Ok(None);
        }

        self.cursor = end;
        Ok(Some(Extent {
            offset: start,
            length: end - start,
        }))
    }
}

impl Iterator for Extents<'_> {
    type Item = Result<Extent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_extent() {
            Ok(Some(extent)) => Some(Ok(extent)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Extents<'_> {}

/// Start scanning `file` for data extents.
pub fn extents(file: &File) -> Result<Extents<'_>> {
    Extents::new(file)
}
