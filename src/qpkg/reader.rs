use std::io::{Read, Seek, SeekFrom};

use super::config::Configuration;
use super::container::read_raw_config;
use super::error::Result;
use super::header::read_script_len;

/// QPKG configuration reader
pub struct QpkgReader<R: Read + Seek> {
    stream: R,
}

impl<R: Read + Seek> QpkgReader<R> {
    /// Create a reader over a complete QPKG stream.
    ///
    /// Pass `&mut stream` to keep ownership of the stream; it is never
    /// written to.
    pub fn new(stream: R) -> Self {
        Self { stream }
    }

    /// Read and parse `qpkg.cfg`.
    pub fn read_config(&mut self) -> Result<Configuration> {
        let script_len = self.script_len()?;
        let raw = self.raw_config(script_len)?;
        Ok(Configuration::parse(&raw))
    }

    /// Scan the text header for the offset of the embedded archive.
    pub fn script_len(&mut self) -> Result<u64> {
        self.stream.seek(SeekFrom::Start(0))?;
        read_script_len(&mut self.stream)
    }

    /// Read the unparsed `qpkg.cfg` text from the archive at `script_len`.
    pub fn raw_config(&mut self, script_len: u64) -> Result<String> {
        // header scanning reads ahead, so the position must be absolute
        self.stream.seek(SeekFrom::Start(script_len))?;
        read_raw_config(&mut self.stream)
    }

    /// Give the stream back to the caller.
    pub fn into_inner(self) -> R {
        self.stream
    }
}

/// Read the configuration of the QPKG in `stream`.
pub fn read_package_info<R: Read + Seek>(stream: R) -> Result<Configuration> {
    QpkgReader::new(stream).read_config()
}
