//! The two archive layers between the header and `qpkg.cfg`.
//!
//! At `script_len` sits a tar archive whose first regular entry (the
//! control entry) is itself a tar archive, gzip-compressed when its name
//! ends in `.gz`. That inner archive holds `qpkg.cfg`.

use flate2::read::GzDecoder;
use std::io::{self, Read};
use tar::{Archive, Entries, Entry};

use super::error::{QpkgError, Result};

/// Name of the configuration entry inside the inner archive.
pub const CONFIG_ENTRY_NAME: &str = "qpkg.cfg";

/// Control entries with this suffix are gzip-compressed.
pub const GZIP_SUFFIX: &str = ".gz";

/// Data of the control entry, inflated when its name says so.
///
/// Errors raised while inflating are remembered so that a failed inner
/// scan can be reported as a decompression failure instead of plain I/O.
pub enum EntryStream<R: Read> {
    Plain(R),
    Gzip { decoder: GzDecoder<R>, failed: bool },
}

impl<R: Read> EntryStream<R> {
    /// Wrap `data` in a gzip decoder if `name` ends with `.gz`.
    pub fn new(name: &str, data: R) -> Self {
        if name.ends_with(GZIP_SUFFIX) {
            log::debug!("control entry {} is gzip-compressed", name);
            EntryStream::Gzip {
                decoder: GzDecoder::new(data),
                failed: false,
            }
        } else {
            EntryStream::Plain(data)
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, EntryStream::Gzip { .. })
    }

    /// Whether the gzip decoder has failed a read.
    pub fn decompression_failed(&self) -> bool {
        matches!(self, EntryStream::Gzip { failed: true, .. })
    }
}

impl<R: Read> Read for EntryStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryStream::Plain(data) => data.read(buf),
            EntryStream::Gzip { decoder, failed } => decoder.read(buf).inspect_err(|e| {
                if e.kind() != io::ErrorKind::Interrupted {
                    *failed = true;
                }
            }),
        }
    }
}

/// Read the text of `qpkg.cfg` from an outer archive starting at the
/// current position of `stream`.
pub fn read_raw_config<R: Read>(stream: R) -> Result<String> {
    let mut outer = Archive::new(stream);
    let mut entries = outer.entries()?;
    let control = first_regular_entry(&mut entries)?.ok_or(QpkgError::MissingControlEntry)?;

    let name = String::from_utf8_lossy(&control.path_bytes()).into_owned();
    log::debug!("control entry: {} ({} bytes)", name, control.size());

    let mut inner = Archive::new(EntryStream::new(&name, control));
    let result = find_config(&mut inner);
    let stream = inner.into_inner();
    match result {
        Err(QpkgError::Io(e)) if stream.decompression_failed() => {
            Err(QpkgError::Decompression(e))
        }
        result => result,
    }
}

/// First regular file of an archive; directories and special entries are
/// passed over.
fn first_regular_entry<'a, R: 'a + Read>(
    entries: &mut Entries<'a, R>,
) -> io::Result<Option<Entry<'a, R>>> {
    for entry in entries {
        let entry = entry?;
        if entry.header().entry_type().is_file() {
            return Ok(Some(entry));
        }
        log::trace!(
            "skipping non-regular outer entry {}",
            String::from_utf8_lossy(&entry.path_bytes())
        );
    }
    Ok(None)
}

/// Upper bound on the buffer reserved up front from a header size field.
const CONFIG_SIZE_HINT: u64 = 64 * 1024;

/// Strip exactly one leading `./` from an archive path.
pub fn normalize_entry_name(name: &str) -> &str {
    name.strip_prefix("./").unwrap_or(name)
}

/// Text of the first `qpkg.cfg` holding data.
///
/// Directories and empty files of that name carry no data and are passed
/// over.
fn find_config<R: Read>(archive: &mut Archive<R>) -> Result<String> {
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        if normalize_entry_name(&name) != CONFIG_ENTRY_NAME {
            log::trace!("skipping inner entry {}", name);
            continue;
        }
        if !entry.header().entry_type().is_file() || entry.size() == 0 {
            log::trace!("skipping {} without data", name);
            continue;
        }

        // the size field is untrusted, let the buffer grow with the data
        let size = entry.size();
        let mut raw = Vec::with_capacity(size.min(CONFIG_SIZE_HINT) as usize);
        entry.read_to_end(&mut raw)?;
        if raw.len() as u64 != size {
            return Err(QpkgError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} truncated: {} of {} bytes", name, raw.len(), size),
            )));
        }
        log::debug!("found {} ({} bytes)", name, raw.len());

        return Ok(match String::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        });
    }

    Err(QpkgError::MissingConfigEntry)
}
