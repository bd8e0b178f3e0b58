//! Main entry point for the qpkginfo CLI application.
//!
//! This binary prints the `qpkg.cfg` metadata of QPKG packages read from
//! the local filesystem or from remote HTTP URLs.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use qpkginfo::{Cli, Configuration, HttpRangeReader, LocalFileReader, ReadAt, ReadAtCursor};

/// Read-ahead for remote sources; the control archive usually fits in one request.
const HTTP_BUFFER_SIZE: usize = 256 * 1024;

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate source
/// based on whether the input is a local file or HTTP URL.
fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let config = if cli.is_http_url() {
        // Handle remote package via HTTP Range requests
        let reader = Arc::new(HttpRangeReader::new(cli.file.clone())?);
        let transferred_before = reader.transferred_bytes();

        let config = read_config(reader.clone(), HTTP_BUFFER_SIZE)
            .with_context(|| format!("failed to read {}", cli.file))?;

        // Display network transfer statistics for HTTP sources
        if !cli.quiet {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!(
                "Total bytes transferred: {} of {}",
                format_size(transferred),
                format_size(reader.size())
            );
        }
        config
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))
            .with_context(|| format!("cannot open {}", cli.file))?;
        read_config(reader, 8 * 1024).with_context(|| format!("failed to read {}", cli.file))?
    };

    print_config(&config, &cli)
}

/// Decode the package configuration from any random access source.
fn read_config<R: ReadAt>(reader: R, buffer_size: usize) -> Result<Configuration> {
    let stream = BufReader::with_capacity(buffer_size, ReadAtCursor::new(reader));
    Ok(qpkginfo::read_package_info(stream)?)
}

/// Print the configuration in the format selected on the command line.
///
/// Requested keys that are missing are reported after the others are
/// printed.
fn print_config(config: &Configuration, cli: &Cli) -> Result<()> {
    if cli.raw {
        print!("{}", config.raw());
        return Ok(());
    }

    let selected: Vec<(&str, Option<&str>)> = if cli.keys.is_empty() {
        config.fields().map(|(k, v)| (k, Some(v))).collect()
    } else {
        cli.keys
            .iter()
            .map(|k| (k.as_str(), config.get(k).filter(|_| !k.is_empty())))
            .collect()
    };

    let missing: Vec<&str> = selected
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();

    if cli.json {
        let found: BTreeMap<&str, &str> = selected
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if cli.keys.is_empty() {
        for (key, value) in selected.iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
            println!("{}={}", key, value);
        }
    } else {
        // Single values are printed bare, for use in scripts
        for value in selected.iter().filter_map(|(_, v)| *v) {
            println!("{}", value);
        }
    }

    if !missing.is_empty() {
        bail!("key(s) not found: {}", missing.join(", "));
    }

    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
