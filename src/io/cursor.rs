//! `Read + Seek` view over a [`ReadAt`] source.

use std::io::{self, Read, Seek, SeekFrom};

use super::ReadAt;

/// Adapts a positioned reader into a stream with its own cursor.
///
/// The QPKG decoder consumes a plain seekable stream; this lets local
/// files and HTTP sources feed it the same way. Wrap it in a
/// [`BufReader`](std::io::BufReader) for sources where each read is
/// expensive.
pub struct ReadAtCursor<R: ReadAt> {
    reader: R,
    pos: u64,
}

impl<R: ReadAt> ReadAtCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Current absolute position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: ReadAt> Read for ReadAtCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.reader.size() {
            return Ok(0);
        }
        let n = self.reader.read_at(self.pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: ReadAt> Seek for ReadAtCursor<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.reader.size().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };

        match target {
            Some(target) => {
                self.pos = target;
                Ok(target)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
