use assert_cmd::Command;
use assert_fs::{TempDir, prelude::*};

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).expect("Must be able to find bencode-canon binary")
}

#[test]
fn basic_stdin_test() {
    cmd()
        .write_stdin(b"d1:bi1e1:ai0ee")
        .assert()
        .success()
        .stdout("d1:ai0e1:bi1ee");
}

#[test]
fn every_value_is_rewritten() {
    cmd()
        .write_stdin(b"i1ed1:b0:1:a0:ele")
        .assert()
        .success()
        .stdout("i1ed1:a0:1:b0:ele");
}

#[test]
fn check_mode() {
    cmd()
        .arg("--check")
        .write_stdin(b"d1:ai0e1:bi1ee")
        .assert()
        .success()
        .stdout("");

    let assert = cmd()
        .arg("--check")
        .write_stdin(b"d1:bi1e1:ai0ee")
        .assert()
        .failure();
    assert!(stderr_of(&assert).contains("is not canonical"));
}

#[test]
fn malformed_input_fails() {
    let assert = cmd().write_stdin(b"li1e").assert().failure();
    assert!(stderr_of(&assert).contains("stdin"));

    cmd()
        .args(["--max-depth", "1"])
        .write_stdin(b"llee")
        .assert()
        .failure();
}

fn nested_lists(depth: usize) -> Vec<u8> {
    let mut bytes = vec![b'l'; depth];
    bytes.extend(vec![b'e'; depth]);
    bytes
}

#[test]
fn max_depth_applies_to_decoding_and_encoding() {
    let deep = nested_lists(2500);

    cmd()
        .args(["--max-depth", "3000"])
        .write_stdin(deep.clone())
        .assert()
        .success()
        .stdout(deep.clone());

    let assert = cmd().write_stdin(deep).assert().failure();
    assert!(stderr_of(&assert).contains("nesting depth"));
}

#[test]
fn basic_file_test() {
    let tmpdir = TempDir::new().expect("Must be able to create temp dir");
    let f1 = tmpdir.child("f1.bencode");
    f1.write_binary(b"li2ei1ee")
        .expect("Must be able to create temp file");
    let f1p = f1.to_str().expect("Temp file path was not valid unicode");

    cmd()
        .arg(f1p)
        .assert()
        .success()
        .stdout("li2ei1ee");

    let f2 = tmpdir.child("f2.bencode");
    f2.write_binary(b"d3:zzzi1e3:aaali123eee")
        .expect("Must be able to create temp file");
    let f2p = f2.to_str().expect("Temp file path was not valid unicode");

    cmd()
        .arg(f1p)
        .arg(f2p)
        .assert()
        .success()
        .stdout("li2ei1eed3:aaali123ee3:zzzi1ee");

    let assert = cmd()
        .arg(tmpdir.child("missing.bencode").to_str().expect("valid unicode"))
        .assert()
        .failure();
    assert!(stderr_of(&assert).contains("Could not read file"));
}
