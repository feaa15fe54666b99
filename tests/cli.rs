//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn calltrace() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("calltrace").expect("Failed to find calltrace binary")
}

fn setup_project() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/foo.ts"),
        r#"
export class Foo {
    baz() {
        this.qux();
    }

    qux() {}
}
"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_help_lists_flag_aliases() {
    calltrace()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ignorePackage"))
        .stdout(predicate::str::contains("omitFileNames"));
}

#[test]
fn test_trace_prints_diagram() {
    let dir = setup_project();

    calltrace()
        .args(["src/foo.ts", "Foo.baz", "--tsconfig", "tsconfig.json"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("direction: down\n"))
        .stdout(predicate::str::contains(
            "\"Current File\".\"Foo\".\"baz()\" -> \"Current File\".\"Foo\".\"qux()\"",
        ));
}

#[test]
fn test_camel_case_aliases_are_accepted() {
    let dir = setup_project();

    calltrace()
        .args(["src/foo.ts", "Foo.baz", "--omitFileNames", "--dontGroupClasses"])
        .args(["--ignorePackage", "lib-x"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Foo\".\"baz()\" -> \"Foo\".\"qux()\""));
}

#[test]
fn test_missing_method_fails_with_empty_stdout() {
    let dir = setup_project();

    calltrace()
        .args(["src/foo.ts", "Foo.bar"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Method 'bar' not found in class 'Foo'",
        ));
}

#[test]
fn test_missing_tsconfig_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.ts"), "export function a() {}").unwrap();

    calltrace()
        .args(["a.ts", "a"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Cannot find tsconfig"));
}
