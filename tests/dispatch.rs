use assert_cmd::Command;
use predicates::str::contains;
use std::os::unix::fs::symlink;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("regtool").expect("binary builds")
}

#[test]
fn direct_mode_runs_the_named_command() {
    cmd()
        .args(["shl", "1", "3"])
        .assert()
        .success()
        .stdout("0x8\n");
}

#[test]
fn alias_mode_resolves_through_a_symlink() {
    let tmp = TempDir::new().expect("temp dir");
    let link = tmp.path().join("shl");
    symlink(assert_cmd::cargo::cargo_bin("regtool"), &link).expect("create alias");

    let mut aliased = Command::from_std(std::process::Command::new(&link));
    aliased.args(["1", "3"]).assert().success().stdout("0x8\n");
}

#[test]
fn alias_arity_counts_the_invoking_path() {
    // Through an alias the path itself is argument 0, so `shl` wants
    // exactly two more.
    let tmp = TempDir::new().expect("temp dir");
    let link = tmp.path().join("shl");
    symlink(assert_cmd::cargo::cargo_bin("regtool"), &link).expect("create alias");

    let mut aliased = Command::from_std(std::process::Command::new(&link));
    aliased
        .arg("1")
        .assert()
        .code(1)
        .stderr(contains("usage:"))
        .stderr(contains("<value> <shift>"));
}

#[test]
fn arity_violations_print_usage_and_fail() {
    cmd()
        .args(["shl", "1"])
        .assert()
        .code(1)
        .stderr(contains("usage: shl <value> <shift>"));

    cmd()
        .args(["shl", "1", "2", "3"])
        .assert()
        .code(1)
        .stderr(contains("usage: shl <value> <shift>"));
}

#[test]
fn unknown_subcommands_fall_back_with_a_diagnostic() {
    cmd()
        .arg("--bogus")
        .assert()
        .code(1)
        .stderr(contains("'--bogus' sub-command not supported"));
}

#[test]
fn bare_invocations_print_usage() {
    cmd().assert().code(1).stderr(contains("usage:"));
}

#[test]
fn malformed_numbers_are_rejected() {
    cmd()
        .args(["shl", "0x1zz", "3"])
        .assert()
        .code(1)
        .stderr(contains("invalid numeric value"));
}

#[test]
fn missing_devices_surface_as_open_errors() {
    // No machine has a cpu 99999; the msr open must fail cleanly.
    cmd()
        .args(["rdmsr", "99999", "0x10"])
        .assert()
        .code(1)
        .stderr(contains("open(\"/dev/cpu/99999/msr\")"));
}

#[test]
fn cmos_rejects_rtc_bytes() {
    cmd()
        .args(["cmos_read", "2"])
        .assert()
        .code(1)
        .stderr(contains("can't read bytes below 14"));
}
