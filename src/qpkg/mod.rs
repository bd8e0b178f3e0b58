//! QPKG package metadata.
//!
//! This module reads the configuration of a QNAP package without
//! unpacking its payload.
//!
//! ## Format Overview
//!
//! A QPKG file consists of:
//! 1. A shell script header containing a `script_len=<offset>` line
//! 2. A tar archive starting at byte `script_len`
//! 3. As that archive's first regular entry, a second tar archive
//!    (gzip-compressed when the entry name ends in `.gz`)
//! 4. Inside it, `qpkg.cfg`: `KEY=value` lines, `#` comments
//!
//! ## Architecture
//!
//! - [`header`]: locating `script_len` in the text header
//! - [`container`]: the outer archive, optional gzip layer and inner archive
//! - [`config`]: parsing `qpkg.cfg` into a [`Configuration`]
//! - [`reader`]: [`QpkgReader`] driving the stages in order
//!
//! Every stage reads its input once, sequentially. The only seek is the
//! absolute jump to `script_len`.
//!
//! ## Limitations
//!
//! - Read only: no package creation or modification
//! - No signature or checksum verification
//! - Payload files other than `qpkg.cfg` are never extracted

pub mod config;
pub mod container;
mod error;
pub mod header;
mod reader;

pub use config::Configuration;
pub use error::{QpkgError, Result};
pub use reader::{QpkgReader, read_package_info};
