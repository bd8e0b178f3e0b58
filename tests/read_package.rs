//! End-to-end reads of QPKG files built in memory.

use std::io::{Cursor, Seek, SeekFrom, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;

use qpkginfo::qpkg::config::RAW_KEY;
use qpkginfo::{LocalFileReader, QpkgError, QpkgReader, ReadAtCursor, read_package_info};

const CONFIG: &str = "QPKG_NAME=Test\n# comment\nVERSION = \"1.0\"\n";

fn tar_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (name, data) in files {
        let mut header = Header::new_gnu();
        // written verbatim, set_path would drop a leading "./"
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Shell header declaring `script_len`, padded up to that offset.
fn header(script_len: usize, declared: &str) -> Vec<u8> {
    let mut header = format!("#!/bin/sh\n{}\nexit 1\n", declared).into_bytes();
    assert!(header.len() <= script_len);
    header.resize(script_len, b'\n');
    header
}

/// A package whose outer archive holds a gzip-compressed control archive.
fn package(config: &str) -> Vec<u8> {
    let control = gzip(&tar_of(&[
        ("./qpkg.cfg", config.as_bytes()),
        ("./package_routines", b"#!/bin/sh\n"),
    ]));
    let outer = tar_of(&[("control.tar.gz", control.as_slice())]);

    let mut qpkg = header(512, "script_len=512");
    qpkg.extend_from_slice(&outer);
    // trailing payload that must never be touched
    qpkg.extend_from_slice(&[0xAB; 4096]);
    qpkg
}

#[test]
fn reads_gzip_control_archive() {
    let config = read_package_info(Cursor::new(package(CONFIG))).unwrap();

    let entries: Vec<(String, String)> = config
        .into_map()
        .into_iter()
        .collect();
    assert_eq!(
        entries,
        vec![
            (String::new(), CONFIG.to_string()),
            ("QPKG_NAME".to_string(), "Test".to_string()),
            ("VERSION".to_string(), "1.0".to_string()),
        ]
    );
}

#[test]
fn reads_plain_control_archive() {
    let control = tar_of(&[("qpkg.cfg", b"QPKG_NAME=Plain\nQPKG_VER=2.1\n")]);
    let outer = tar_of(&[("control.tar", control.as_slice())]);
    let mut qpkg = header(1024, "  script_len = 1024 ");
    qpkg.extend_from_slice(&outer);

    let config = read_package_info(Cursor::new(qpkg)).unwrap();
    assert_eq!(config.name(), Some("Plain"));
    assert_eq!(config.version(), Some("2.1"));
}

#[test]
fn raw_entry_is_byte_exact() {
    let raw = "QPKG_DISPLAY_NAME=\"Demo App\"\r\n\r\nQPKG_AUTHOR=someone\n  #x=y\n";
    let config = read_package_info(Cursor::new(package(raw))).unwrap();
    assert_eq!(config.raw(), raw);
    assert_eq!(config.get(RAW_KEY), Some(raw));
    assert_eq!(config.display_name(), Some("Demo App"));
}

#[test]
fn independent_reads_agree() {
    let bytes = package(CONFIG);
    let first = read_package_info(Cursor::new(bytes.clone())).unwrap();
    let second = read_package_info(Cursor::new(bytes)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn reader_borrows_stream() {
    let mut stream = Cursor::new(package(CONFIG));
    stream.seek(SeekFrom::End(0)).unwrap();

    let mut reader = QpkgReader::new(&mut stream);
    assert_eq!(reader.script_len().unwrap(), 512);
    assert_eq!(reader.raw_config(512).unwrap(), CONFIG);
    assert_eq!(reader.read_config().unwrap().get("QPKG_NAME"), Some("Test"));
    drop(reader);

    // the stream is still usable by its owner
    stream.seek(SeekFrom::Start(0)).unwrap();
}

#[test]
fn missing_script_len() {
    let mut qpkg = b"#!/bin/sh\nQDK_VER=2.3\n".to_vec();
    qpkg.extend_from_slice(&tar_of(&[]));
    assert!(matches!(
        read_package_info(Cursor::new(qpkg)),
        Err(QpkgError::MissingLengthField)
    ));
}

#[test]
fn zero_script_len() {
    let mut qpkg = package(CONFIG);
    qpkg[..512].copy_from_slice(&header(512, "script_len=0"));
    assert!(matches!(
        read_package_info(Cursor::new(qpkg)),
        Err(QpkgError::MissingLengthField)
    ));
}

#[test]
fn empty_outer_archive() {
    let mut qpkg = header(512, "script_len=512");
    qpkg.extend_from_slice(&tar_of(&[]));
    assert!(matches!(
        read_package_info(Cursor::new(qpkg)),
        Err(QpkgError::MissingControlEntry)
    ));
}

#[test]
fn script_len_past_end_of_file() {
    let qpkg = header(512, "script_len=99999");
    assert!(matches!(
        read_package_info(Cursor::new(qpkg)),
        Err(QpkgError::MissingControlEntry)
    ));
}

#[test]
fn control_archive_without_config() {
    let control = gzip(&tar_of(&[("./qpkg.cfg.bak", b"A=1\n"), ("./icons/qpkg.cfg", b"B=2\n")]));
    let outer = tar_of(&[("control.tar.gz", control.as_slice())]);
    let mut qpkg = header(512, "script_len=512");
    qpkg.extend_from_slice(&outer);

    assert!(matches!(
        read_package_info(Cursor::new(qpkg)),
        Err(QpkgError::MissingConfigEntry)
    ));
}

#[test]
fn corrupt_gzip_control_archive() {
    let outer = tar_of(&[("control.tar.gz", b"this is not gzip at all")]);
    let mut qpkg = header(512, "script_len=512");
    qpkg.extend_from_slice(&outer);

    let err = read_package_info(Cursor::new(qpkg)).unwrap_err();
    assert!(matches!(err, QpkgError::Decompression(_)), "{err}");
}

#[test]
fn reads_local_file_through_cursor() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&package(CONFIG)).unwrap();
    file.flush().unwrap();

    let reader = LocalFileReader::new(file.path()).unwrap();
    let stream = std::io::BufReader::new(ReadAtCursor::new(reader));
    let config = read_package_info(stream).unwrap();
    assert_eq!(config.get("VERSION"), Some("1.0"));
}
