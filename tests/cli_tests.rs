//! Exercises the built binary end-to-end: exit codes for a valid
//! program, an invalid one, and the `.tpl` extension guard.

use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn tpl_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".tpl")
        .tempfile()
        .expect("creating temp .tpl file");
    file.write_all(contents.as_bytes()).expect("writing temp .tpl file");
    file
}

fn run(path: &std::path::Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tplverify"))
        .arg(path)
        .output()
        .expect("running tplverify")
}

#[test]
fn valid_program_exits_zero() {
    let file = tpl_file("INT FUNCTION add(INT a, INT b) { @PRE TRUE; @POST rv == a + b; RETURN a + b; }");
    let output = run(file.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn invalid_program_exits_nonzero() {
    let file = tpl_file("INT FUNCTION buggy(INT x) { @PRE x >= 0; @POST rv > x; RETURN x; }");
    let output = run(file.path());
    assert!(!output.status.success());
}

#[test]
fn wrong_extension_is_rejected_before_parsing() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().expect("creating temp file");
    file.write_all(b"not even close to a program").expect("writing temp file");
    let output = run(file.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains(".tpl"));
}
