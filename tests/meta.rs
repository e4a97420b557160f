use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("regtool").expect("binary builds")
}

#[test]
fn list_cmds_names_every_group() {
    let assert = cmd().arg("--list-cmds").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 listing");

    for group in ["CMOS", "IO", "MMIO", "PCI", "MSR", "SCOM", "SMBus", "LOGIC", "MISC"] {
        assert!(
            out.lines().any(|l| l == group || l.starts_with(&format!("{group}: "))),
            "group {group} missing from listing:\n{out}"
        );
    }

    for command in [
        "  cmos_read",
        "  io_write16",
        "  mmio_dump",
        "  pci_read32",
        "  rdmsr",
        "  getscom",
        "  smbus_quick",
        "  bts",
        "  cpu_list",
    ] {
        assert!(out.contains(command), "{command} missing from listing:\n{out}");
    }
}

#[test]
fn list_cmds_keeps_groups_above_their_commands() {
    let assert = cmd().arg("--list-cmds").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 listing");
    let lines: Vec<&str> = out.lines().collect();

    let logic = lines
        .iter()
        .position(|l| l.starts_with("LOGIC"))
        .expect("LOGIC listed");
    assert_eq!(lines[logic + 1], "  or");
    assert_eq!(lines[logic + 2], "  and");
}

#[test]
fn version_prints_name_and_number() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(concat!("regtool ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn help_exits_cleanly() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--list-cmds"));
}

#[test]
fn links_are_created_next_to_the_binary_and_cleaned_up() {
    // Run a private copy of the binary so links land in a sandbox, not in
    // the build directory.
    let tmp = TempDir::new().expect("temp dir");
    let bin = tmp.path().join("regtool");
    fs::copy(assert_cmd::cargo::cargo_bin("regtool"), &bin).expect("copy binary");

    Command::from_std(std::process::Command::new(&bin))
        .arg("--make-links")
        .assert()
        .success()
        .stdout(contains("Creating link:"));

    for name in ["shl", "pci_read8", "cmos_write", "smbus_read16"] {
        let link = tmp.path().join(name);
        let meta = fs::symlink_metadata(&link).expect("link exists");
        assert!(meta.file_type().is_symlink(), "{name} is not a symlink");
        assert_eq!(
            fs::read_link(&link).expect("link target"),
            std::path::PathBuf::from("regtool")
        );
    }

    // The links are live aliases.
    Command::from_std(std::process::Command::new(tmp.path().join("shl")))
        .args(["1", "3"])
        .assert()
        .success()
        .stdout("0x8\n");

    Command::from_std(std::process::Command::new(&bin))
        .arg("--clean-links")
        .assert()
        .success();

    for name in ["shl", "pci_read8", "cmos_write", "smbus_read16"] {
        assert!(
            fs::symlink_metadata(tmp.path().join(name)).is_err(),
            "{name} survived --clean-links"
        );
    }
}

#[test]
fn clean_links_tolerates_absent_links() {
    let tmp = TempDir::new().expect("temp dir");
    let bin = tmp.path().join("regtool");
    fs::copy(assert_cmd::cargo::cargo_bin("regtool"), &bin).expect("copy binary");

    Command::from_std(std::process::Command::new(&bin))
        .arg("--clean-links")
        .assert()
        .success();
}

#[test]
fn meta_flags_reject_extra_arguments() {
    cmd()
        .args(["--list-cmds", "extra"])
        .assert()
        .code(1)
        .stderr(contains("usage:"));
}
