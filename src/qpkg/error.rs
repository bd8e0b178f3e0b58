//! Error types for QPKG decoding.
//!
//! Every failure is fatal to the read that produced it; no partial
//! configuration is ever returned. The first four variants classify
//! malformed packages, [`Io`](QpkgError::Io) covers the transport.

use std::io;

/// Result type alias for operations that may return a [`QpkgError`].
pub type Result<T> = std::result::Result<T, QpkgError>;

#[derive(Debug, thiserror::Error)]
pub enum QpkgError {
    /// No `script_len` line was found in the header, or its value is
    /// zero or not a decimal integer.
    #[error("no script_len value found")]
    MissingLengthField,

    /// The outer archive at `script_len` has no regular first entry.
    #[error("no control entry found")]
    MissingControlEntry,

    /// The control entry is named `*.gz` but its data is not valid gzip.
    #[error("failed to decompress control entry: {0}")]
    Decompression(#[source] io::Error),

    /// The inner archive holds no `qpkg.cfg` entry.
    #[error("no qpkg.cfg found")]
    MissingConfigEntry,

    /// The underlying stream failed, or an archive layer is truncated or
    /// corrupt.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
