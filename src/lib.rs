//! # qpkginfo
//!
//! Read QNAP QPKG package metadata with HTTP URL support using Range requests.
//!
//! This library extracts the `qpkg.cfg` configuration of a QPKG package
//! without unpacking it. Packages can be read from the local filesystem or
//! from remote HTTP servers; for remote files only the header and the
//! control archive are fetched, not the package payload.
//!
//! ## Features
//!
//! - Locate the embedded archive through the `script_len` header field
//! - Plain and gzip-compressed control archives
//! - Lenient `KEY=value` parsing with comments and quoted values
//! - Local files and HTTP/HTTPS URLs behind one seekable stream
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = qpkginfo::read_package_info(File::open("Demo_1.0.qpkg")?)?;
//!
//!     println!("{:?} {:?}", config.name(), config.version());
//!     for (key, value) in config.fields() {
//!         println!("{}={}", key, value);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod qpkg;

pub use cli::Cli;
pub use io::{HttpRangeReader, LocalFileReader, ReadAt, ReadAtCursor};
pub use qpkg::{Configuration, QpkgError, QpkgReader, read_package_info};
