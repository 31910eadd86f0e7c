//! Encoding real sparse files and decoding them back.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::FileExt;
use std::path::Path;

use tempfile::TempDir;
use ursparse_format::{encode, extents, Decoder, ErrorKind, Extent, Result};

const MIB: u64 = 1024 * 1024;

fn create(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .unwrap()
}

/// Build a file of `len` bytes with `data` written at each offset.
fn sparse_file(path: &Path, len: u64, data: &[(u64, &[u8])]) -> File {
    let file = create(path);
    file.set_len(len).unwrap();
    for (offset, bytes) in data {
        file.write_all_at(bytes, *offset).unwrap();
    }
    file.sync_all().unwrap();
    file
}

fn contents(mut file: &File) -> Vec<u8> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_end(&mut buf).unwrap();
    buf
}

fn scan(file: &File) -> Vec<Extent> {
    extents(file).unwrap().collect::<Result<Vec<_>>>().unwrap()
}

/// Whether the filesystem under `dir` reports holes at all.
fn supports_holes(dir: &Path) -> bool {
    let probe = create(&dir.join("probe"));
    probe.set_len(MIB).unwrap();
    scan(&probe).is_empty()
}

fn rewind(mut file: &File) {
    file.seek(SeekFrom::Start(0)).unwrap();
}

fn roundtrip(dir: &Path, source: &File) -> File {
    let wire = create(&dir.join("wire.ursparse"));
    encode(source, &wire).unwrap();

    let decoded = create(&dir.join("decoded"));
    rewind(&wire);
    Decoder::default().decode(&wire, &mut &decoded).unwrap();
    decoded
}

#[test]
fn test_sparse_roundtrip() {
    let dir = TempDir::new().unwrap();
    let first = vec![0xAAu8; 64 * 1024];
    let second = b"tail data".repeat(1000);
    let source = sparse_file(
        &dir.path().join("source"),
        4 * MIB,
        &[(MIB, &first[..]), (3 * MIB, &second[..])],
    );

    let decoded = roundtrip(dir.path(), &source);

    assert_eq!(decoded.metadata().unwrap().len(), 4 * MIB);
    assert_eq!(contents(&decoded), contents(&source));
}

#[test]
fn test_extents_of_sparse_file() {
    let dir = TempDir::new().unwrap();
    if !supports_holes(dir.path()) {
        return;
    }

    let block = vec![1u8; 64 * 1024];
    let source = sparse_file(
        &dir.path().join("source"),
        8 * MIB,
        &[(2 * MIB, &block[..]), (5 * MIB, &block[..])],
    );

    let found = scan(&source);
    assert_eq!(found.len(), 2, "{:?}", found);
    assert!(found[0].offset <= 2 * MIB && found[0].end() >= 2 * MIB + 64 * 1024);
    assert!(found[1].offset <= 5 * MIB && found[1].end() >= 5 * MIB + 64 * 1024);
    assert!(found[0].end() < found[1].offset);
}

#[test]
fn test_extents_ascending_and_cover_data() {
    let dir = TempDir::new().unwrap();
    let block = vec![9u8; 4096];
    let offsets = [0, 3 * MIB, MIB + 4096, 7 * MIB];
    let data: Vec<(u64, &[u8])> = offsets.iter().map(|&o| (o, &block[..])).collect();
    let source = sparse_file(&dir.path().join("source"), 8 * MIB, &data);

    let found = scan(&source);
    for pair in found.windows(2) {
        // Maximal extents never touch.
        assert!(pair[0].end() < pair[1].offset, "{:?}", pair);
    }
    for &offset in &offsets {
        assert!(
            found
                .iter()
                .any(|e| e.offset <= offset && offset + 4096 <= e.end()),
            "no extent covers data at {}",
            offset
        );
    }
}

#[test]
fn test_file_ending_in_data() {
    let dir = TempDir::new().unwrap();
    let source = sparse_file(&dir.path().join("source"), 0, &[(2 * MIB, &b"end"[..])]);
    assert_eq!(source.metadata().unwrap().len(), 2 * MIB + 3);

    let found = scan(&source);
    assert_eq!(found.last().map(|e| e.end()), Some(2 * MIB + 3));

    let decoded = roundtrip(dir.path(), &source);
    assert_eq!(contents(&decoded), contents(&source));
}

#[test]
fn test_all_hole_file() {
    let dir = TempDir::new().unwrap();
    let source = sparse_file(&dir.path().join("source"), 3 * MIB, &[]);

    let wire = create(&dir.path().join("wire"));
    let stats = encode(&source, &wire).unwrap();

    if supports_holes(dir.path()) {
        assert!(scan(&source).is_empty());
        assert_eq!(stats.extents, 0);
        assert_eq!(contents(&wire), format!("{} 0\n", 3 * MIB).into_bytes());
    }

    let decoded = roundtrip(dir.path(), &source);
    assert_eq!(decoded.metadata().unwrap().len(), 3 * MIB);
    assert!(contents(&decoded).iter().all(|&b| b == 0));
}

#[test]
fn test_dense_file_single_extent() {
    let dir = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let source = sparse_file(&dir.path().join("source"), 0, &[(0, &payload[..])]);

    assert_eq!(
        scan(&source),
        vec![Extent {
            offset: 0,
            length: payload.len() as u64
        }]
    );

    let wire = create(&dir.path().join("wire"));
    encode(&source, &wire).unwrap();
    let mut expected = b"0 100000\n".to_vec();
    expected.extend_from_slice(&payload);
    assert_eq!(contents(&wire), expected);
}

#[test]
fn test_empty_file() {
    let dir = TempDir::new().unwrap();
    let source = sparse_file(&dir.path().join("source"), 0, &[]);

    let wire = create(&dir.path().join("wire"));
    let stats = encode(&source, &wire).unwrap();
    assert_eq!(stats.output_bytes, 0);

    let decoded = roundtrip(dir.path(), &source);
    assert_eq!(decoded.metadata().unwrap().len(), 0);
}

#[test]
fn test_map_serializes_as_json() {
    let extent = Extent {
        offset: 4096,
        length: 10,
    };
    assert_eq!(
        serde_json::to_string(&[extent]).unwrap(),
        r#"[{"offset":4096,"length":10}]"#
    );
}

#[test]
fn test_decode_into_pipe_is_unsupported() {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: fds has room for both descriptors.
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    // SAFETY: the descriptors were just created and are owned here.
    let (_read_end, write_end) = unsafe {
        use std::os::fd::FromRawFd;
        (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1]))
    };

    let err = Decoder::default()
        .decode(&b"0 1\nA"[..], &mut &write_end)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedStorage);
}
