//! Text header scanning.
//!
//! A QPKG starts with a shell script. One of its lines carries
//! `script_len=<offset>`, the absolute byte offset at which the embedded
//! archive begins.

use std::io::{self, BufRead, BufReader, Read};

use super::error::{QpkgError, Result};

/// Header field holding the offset of the outer archive.
pub const SCRIPT_LEN_FIELD: &str = "script_len";

/// Bytes scanned for `script_len` before giving up.
pub const MAX_HEADER_SCAN: u64 = 1024 * 1024;

/// Longer lines cannot hold `script_len` and are skipped unread.
const MAX_LINE_LEN: u64 = 4096;

/// Scan header lines for `script_len` and return its value.
///
/// The stream must be positioned at the start of the package. Lines are
/// read through a buffer, so on return the stream cursor is somewhere past
/// the matching line; callers must seek to the returned offset rather
/// than continue reading.
///
/// Only the first `script_len` line counts. A value that is zero or not a
/// decimal integer fails the same way as a missing line, as does a field
/// beyond the first [`MAX_HEADER_SCAN`] bytes.
pub fn read_script_len<R: Read>(stream: R) -> Result<u64> {
    let mut reader = BufReader::new(stream.take(MAX_HEADER_SCAN));
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = (&mut reader).take(MAX_LINE_LEN).read_until(b'\n', &mut line)?;
        if n == 0 {
            log::debug!("reached end of header without {}", SCRIPT_LEN_FIELD);
            return Err(QpkgError::MissingLengthField);
        }
        if n as u64 == MAX_LINE_LEN && line.last() != Some(&b'\n') {
            log::trace!("skipping header line longer than {} bytes", MAX_LINE_LEN);
            skip_line(&mut reader)?;
            continue;
        }

        let text = String::from_utf8_lossy(&line);
        let Some(value) = header_field(&text, SCRIPT_LEN_FIELD) else {
            continue;
        };

        return match value.parse::<u64>() {
            Ok(0) | Err(_) => {
                log::debug!("invalid {} value {:?}", SCRIPT_LEN_FIELD, value);
                Err(QpkgError::MissingLengthField)
            }
            Ok(script_len) => {
                log::debug!("{} = {}", SCRIPT_LEN_FIELD, script_len);
                Ok(script_len)
            }
        };
    }
}

/// Consume input up to and including the next newline.
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Returns the trimmed value of `line` if it reads `<name>=<value>` with
/// exactly one `=`.
fn header_field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let mut fields = line.split('=');
    let (key, value) = (fields.next()?, fields.next()?);
    if fields.next().is_some() || key.trim() != name {
        return None;
    }
    Some(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(header: &str) -> Result<u64> {
        read_script_len(header.as_bytes())
    }

    #[test]
    fn finds_field_among_script_lines() {
        let header = "#!/bin/sh\nQDK_VER=2.3\nscript_len=9216\nexit 0\n";
        assert_eq!(scan(header).unwrap(), 9216);
    }

    #[test]
    fn tolerates_whitespace_around_separator() {
        assert_eq!(scan("  script_len =  512 \r\n").unwrap(), 512);
    }

    #[test]
    fn skips_lines_with_extra_separators() {
        let header = "script_len=1=2\nscript_len=64\n";
        assert_eq!(scan(header).unwrap(), 64);
    }

    #[test]
    fn missing_field() {
        assert!(matches!(
            scan("#!/bin/sh\necho hi\n"),
            Err(QpkgError::MissingLengthField)
        ));
        assert!(matches!(scan(""), Err(QpkgError::MissingLengthField)));
    }

    #[test]
    fn zero_or_garbage_value() {
        assert!(matches!(
            scan("script_len=0\n"),
            Err(QpkgError::MissingLengthField)
        ));
        assert!(matches!(
            scan("script_len=abc\nscript_len=12\n"),
            Err(QpkgError::MissingLengthField)
        ));
        assert!(matches!(
            scan("script_len=-5\n"),
            Err(QpkgError::MissingLengthField)
        ));
    }

    #[test]
    fn last_line_without_newline() {
        assert_eq!(scan("a=b\nscript_len=77").unwrap(), 77);
    }

    #[test]
    fn skips_overlong_lines() {
        let mut header = vec![b'x'; 100 * 1024];
        header.extend_from_slice(b"script_len=1=\nscript_len=5\n");
        assert_eq!(read_script_len(header.as_slice()).unwrap(), 5);
    }

    #[test]
    fn stops_after_header_region() {
        assert!(matches!(
            read_script_len(std::io::repeat(b'x')),
            Err(QpkgError::MissingLengthField)
        ));
        assert!(matches!(
            read_script_len(std::io::repeat(b'\n')),
            Err(QpkgError::MissingLengthField)
        ));

        let mut header = vec![b'\n'; MAX_HEADER_SCAN as usize];
        header.extend_from_slice(b"script_len=5\n");
        assert!(matches!(
            read_script_len(header.as_slice()),
            Err(QpkgError::MissingLengthField)
        ));
    }

    #[test]
    fn non_utf8_bytes_before_field() {
        let mut header = b"\xff\xfe junk\n".to_vec();
        header.extend_from_slice(b"script_len=3\n");
        assert_eq!(read_script_len(header.as_slice()).unwrap(), 3);
    }
}
