//! End-to-end runs of the `ursparse` binary over stdin and stdout.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn ursparse(args: &[&str], stdin: &Path, stdout: &Path) -> Output {
    let stdout = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(stdout)
        .unwrap();

    Command::new(env!("CARGO_BIN_EXE_ursparse"))
        .args(args)
        .stdin(File::open(stdin).unwrap())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

fn sparse_source(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("source.img");
    let file = File::create(&path).unwrap();
    file.set_len(2 * 1024 * 1024).unwrap();
    file.write_all_at(b"first", 4096).unwrap();
    file.write_all_at(&[0x5a; 8192], 1024 * 1024).unwrap();
    path
}

#[test]
fn test_encode_then_decode() {
    let dir = TempDir::new().unwrap();
    let source = sparse_source(dir.path());
    let wire = dir.path().join("source.ursparse");
    let restored = dir.path().join("restored.img");

    let out = ursparse(&["--sparse"], &source, &wire);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = ursparse(&["-b7"], &wire, &restored);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(std::fs::read(&restored).unwrap(), std::fs::read(&source).unwrap());
}

#[test]
fn test_map_lists_extents() {
    let dir = TempDir::new().unwrap();
    let source = sparse_source(dir.path());
    let map = dir.path().join("map.txt");

    let out = ursparse(&["-m"], &source, &map);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&map).unwrap();
    let extents: Vec<(u64, u64)> = text
        .lines()
        .map(|line| {
            let (offset, length) = line.split_once(' ').unwrap();
            (offset.parse().unwrap(), length.parse().unwrap())
        })
        .collect();

    assert!(!extents.is_empty());
    assert!(extents.iter().any(|&(o, l)| o <= 4096 && 4096 + 5 <= o + l));
    assert!(extents
        .iter()
        .any(|&(o, l)| o <= 1024 * 1024 && 1024 * 1024 + 8192 <= o + l));
}

#[test]
fn test_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let wire = dir.path().join("bad.ursparse");
    std::fs::write(&wire, b"12 x\n").unwrap();

    let out = ursparse(&[], &wire, &dir.path().join("out.img"));
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("malformed token"), "{}", stderr);
}

#[test]
fn test_small_block_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    let wire = dir.path().join("empty.ursparse");
    std::fs::write(&wire, b"").unwrap();

    let out = ursparse(&["-b1"], &wire, &dir.path().join("out.img"));
    assert!(!out.status.success());
}
