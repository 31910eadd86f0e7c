//! Output effects applied while decoding.

use std::fs::File;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Destination of a decoded sparse file.
///
/// Holes are produced by moving the write cursor without writing; meat is
/// written at the cursor, which then advances past it.
pub trait Sink {
    /// Move the write cursor to `offset` without writing anything.
    fn seek_hole(&mut self, offset: u64) -> std::io::Result<()>;

    /// Write `meat` at the cursor and return how many bytes were written.
    fn write_meat(&mut self, meat: &[u8]) -> std::io::Result<usize>;

    /// Make the output at least `len` bytes long. Never shrinks it.
    fn extend_to(&mut self, len: u64) -> std::io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    #[inline]
    fn seek_hole(&mut self, offset: u64) -> std::io::Result<()> {
        (**self).seek_hole(offset)
    }

    #[inline]
    fn write_meat(&mut self, meat: &[u8]) -> std::io::Result<usize> {
        (**self).write_meat(meat)
    }

    #[inline]
    fn extend_to(&mut self, len: u64) -> std::io::Result<()> {
        (**self).extend_to(len)
    }
}

impl Sink for &File {
    fn seek_hole(&mut self, offset: u64) -> std::io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn write_meat(&mut self, meat: &[u8]) -> std::io::Result<usize> {
        self.write_all(meat)?;
        Ok(meat.len())
    }

    fn extend_to(&mut self, len: u64) -> std::io::Result<()> {
        // Devices report a length of 0 and cannot be truncated.
        let meta = self.metadata()?;
        if !meta.is_file() {
            return Ok(());
        }
        // set_len leaves the new tail unallocated.
        if meta.len() < len {
            self.set_len(len)?;
        }
        Ok(())
    }
}

impl Sink for File {
    #[inline]
    fn seek_hole(&mut self, offset: u64) -> std::io::Result<()> {
        (&*self).seek_hole(offset)
    }

    #[inline]
    fn write_meat(&mut self, meat: &[u8]) -> std::io::Result<usize> {
        (&*self).write_meat(meat)
    }

    #[inline]
    fn extend_to(&mut self, len: u64) -> std::io::Result<()> {
        (&*self).extend_to(len)
    }
}

impl Sink for Cursor<Vec<u8>> {
    fn seek_hole(&mut self, offset: u64) -> std::io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn write_meat(&mut self, meat: &[u8]) -> std::io::Result<usize> {
        self.write_all(meat)?;
        Ok(meat.len())
    }

    fn extend_to(&mut self, len: u64) -> std::io::Result<()> {
        let len = usize::try_from(len).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::OutOfMemory,
                "output does not fit in memory",
            )
        })?;
        if self.get_ref().len() < len {
            self.get_mut().resize(len, 0);
        }
        Ok(())
    }
}
