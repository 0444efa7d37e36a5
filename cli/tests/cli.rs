use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn prints_file_with_tab_indent() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(&input, r#"{"b":1,"a":[true,null]}"#);

    cargo_bin_cmd!("ajson")
        .arg(&input)
        .assert()
        .success()
        .stdout("{\n\t\"a\": [\n\t\ttrue,\n\t\tnull\n\t],\n\t\"b\": 1\n}\n");
}

#[test]
fn reads_stdin_when_no_files() {
    cargo_bin_cmd!("ajson")
        .write_stdin("[1.5, \"x\", {}]")
        .assert()
        .success()
        .stdout("[\n\t1.5,\n\t\"x\",\n\t{}\n]\n");
}

#[test]
fn space_indent_option() {
    cargo_bin_cmd!("ajson")
        .args(["--indent", "2"])
        .write_stdin(r#"{"k":[1]}"#)
        .assert()
        .success()
        .stdout("{\n  \"k\": [\n    1\n  ]\n}\n");
}

#[test]
fn multiple_files_share_one_region() {
    let dir = TempDir::new().expect("tempdir");
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    write_file(&first, "[1]");
    write_file(&second, r#"{"a":"b"}"#);

    cargo_bin_cmd!("ajson")
        .arg(&first)
        .arg(&second)
        .args(["--block-size", "256", "--stats"])
        .assert()
        .success()
        .stdout("[\n\t1\n]\n{\n\t\"a\": \"b\"\n}\n")
        .stderr(
            contains("first.json region")
                .and(contains("second.json region"))
                .and(contains("\"block_size\":256")),
        );
}

#[test]
fn check_mode_accepts_escapes() {
    cargo_bin_cmd!("ajson")
        .arg("--check")
        .write_stdin(r#"{"s":"line\nbreak é \"q\""}"#)
        .assert()
        .success()
        .stdout("{\n\t\"s\": \"line\\nbreak é \\\"q\\\"\"\n}\n");
}

#[test]
fn raw_escapes_print_verbatim() {
    cargo_bin_cmd!("ajson")
        .args(["--raw-escapes", "--check"])
        .write_stdin(r#"["a\tb\u0041"]"#)
        .assert()
        .success()
        .stdout("[\n\t\"a\\tb\\u0041\"\n]\n");
}

#[test]
fn writes_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let output = dir.path().join("out.json");

    cargo_bin_cmd!("ajson")
        .arg("--output")
        .arg(&output)
        .write_stdin("true")
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&output).expect("read output"), "true\n");
}

#[test]
fn parse_error_reports_location() {
    cargo_bin_cmd!("ajson")
        .write_stdin("[1,2,]")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("ERROR  stdin: expected value, found ']' at line 1 column 6 (offset 5)"));
}

#[test]
fn duplicate_key_is_rejected() {
    cargo_bin_cmd!("ajson")
        .write_stdin(r#"{"a":1,"a":2}"#)
        .assert()
        .failure()
        .stderr(contains("duplicate key \"a\""));
}

#[test]
fn max_depth_option_limits_nesting() {
    cargo_bin_cmd!("ajson")
        .args(["--max-depth", "1"])
        .write_stdin("[[0]]")
        .assert()
        .failure()
        .stderr(contains("nesting too deep"));
}

#[test]
fn rejects_invalid_indent() {
    cargo_bin_cmd!("ajson")
        .args(["--indent", "wide"])
        .write_stdin("null")
        .assert()
        .failure()
        .stderr(contains("Invalid indent"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("missing.json");

    cargo_bin_cmd!("ajson")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("missing.json")));
}
