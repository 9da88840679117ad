use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("doclens")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_files_help_shows_subcommands() {
    cargo_bin_cmd!("doclens")
        .args(["files", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("delete-all"));
}

#[test]
fn test_ask_requires_a_file() {
    cargo_bin_cmd!("doclens")
        .args(["ask", "-p", "What is this?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}
