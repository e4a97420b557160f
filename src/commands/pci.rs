//! PCI configuration space access through sysfs, with a procfs fallback for
//! old kernels.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::device;
use crate::value::{SizedValue, Width};
use anyhow::Context;
use std::fs::File;
use std::path::PathBuf;

const SYSFS_BASE_DIR: &str = "/sys/bus/pci/devices";
const PROC_BASE_DIR: &str = "/proc/bus/pci";

// TODO: support PCI segments other than 0000.
fn open_config(bus: u32, dev: u32, func: u32, write: bool) -> anyhow::Result<File> {
    let sysfs = PathBuf::from(format!(
        "{SYSFS_BASE_DIR}/0000:{bus:02x}:{dev:02x}.{func:x}/config"
    ));
    let proc = PathBuf::from(format!("{PROC_BASE_DIR}/{bus:02x}/{dev:02x}.{func:x}"));

    device::open_for(&sysfs, write)
        .or_else(|_| device::open_for(&proc, write))
        .with_context(|| format!("unable to access PCI device '{bus:02x}:{dev:02x}.{func:x}'"))
}

fn pci_width(info: &CommandDescriptor, what: &str) -> anyhow::Result<Width> {
    match info.config.width() {
        Some(width @ (Width::W8 | Width::W16 | Width::W32)) => Ok(width),
        _ => anyhow::bail!("invalid {what} entry"),
    }
}

fn read(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = pci_width(info, "pci_read")?;
    let bus = parse::parse_u32(&argv[1])?;
    let dev = parse::parse_u32(&argv[2])?;
    let func = parse::parse_u32(&argv[3])?;
    let reg = parse::parse_u64(&argv[4])?;

    let mut file = open_config(bus, dev, func, false)?;
    device::seek_to(&mut file, reg)?;
    let value = device::read_sized(&mut file, width)?;
    println!("{value}");
    Ok(0)
}

fn write(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = pci_width(info, "pci_write")?;
    let bus = parse::parse_u32(&argv[1])?;
    let dev = parse::parse_u32(&argv[2])?;
    let func = parse::parse_u32(&argv[3])?;
    let reg = parse::parse_u64(&argv[4])?;
    let data = SizedValue::truncate_from(width, parse::parse_u64(&argv[5])?);

    let mut file = open_config(bus, dev, func, true)?;
    device::seek_to(&mut file, reg)?;
    device::write_sized(&mut file, data)?;
    Ok(0)
}

fn read_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(read(argv, info))
}

fn write_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(write(argv, info))
}

pub fn group() -> CommandGroup {
    let rd = PrereqSpec::exact(5, "<bus> <dev> <func> <reg>");
    let wr = PrereqSpec::exact(6, "<bus> <dev> <func> <reg> <data>");

    CommandGroup::new(
        "PCI",
        Some("commands to access PCI registers"),
        vec![
            CommandDescriptor::with_prereqs(
                "pci_read8",
                read_entry,
                CommandConfig::Width(Width::W8),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "pci_write8",
                write_entry,
                CommandConfig::Width(Width::W8),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "pci_read16",
                read_entry,
                CommandConfig::Width(Width::W16),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "pci_write16",
                write_entry,
                CommandConfig::Width(Width::W16),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "pci_read32",
                read_entry,
                CommandConfig::Width(Width::W32),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "pci_write32",
                write_entry,
                CommandConfig::Width(Width::W32),
                wr,
            ),
        ],
    )
}
