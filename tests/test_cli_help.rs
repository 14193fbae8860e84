use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_tools() {
    let mut cmd = Command::cargo_bin("lordt").unwrap();
    cmd.arg("help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Version:"))
        .stdout(predicate::str::contains("help -"))
        .stdout(predicate::str::contains("nlock -"))
        .stdout(predicate::str::contains("lordt <tool> help"));
}

#[test]
fn test_no_arguments_prints_help() {
    let mut cmd = Command::cargo_bin("lordt").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nlock -"));
}

#[test]
fn test_unknown_tool_prints_help() {
    let mut cmd = Command::cargo_bin("lordt").unwrap();
    cmd.arg("shred");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nlock -"))
        .stderr(predicate::str::contains("invalid command: shred"));
}

#[test]
fn test_nlock_help_describes_options() {
    for args in [vec!["nlock"], vec!["nlock", "help"]] {
        let mut cmd = Command::cargo_bin("lordt").unwrap();
        cmd.args(&args);

        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Usage: lordt nlock"))
            .stdout(predicate::str::contains("--pattern="))
            .stdout(predicate::str::contains("-log"))
            .stdout(predicate::str::contains("-kill"))
            .stdout(predicate::str::contains("--conf="))
            .stdout(predicate::str::contains("best-effort"));
    }
}
