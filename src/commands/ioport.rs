//! I/O address space access through `/dev/port`.
//!
//! The prerequisite raises the I/O privilege level before the entry runs;
//! port registers misbehave when poked without it on some chipsets.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::device;
use crate::value::{SizedValue, Width};
use std::path::Path;

const DEVICE: &str = "/dev/port";
const IOPL_LEVEL: i32 = 3;

fn port_width(info: &CommandDescriptor, what: &str) -> anyhow::Result<Width> {
    match info.config.width() {
        Some(width @ (Width::W8 | Width::W16 | Width::W32)) => Ok(width),
        _ => anyhow::bail!("invalid {what} entry"),
    }
}

fn read(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = port_width(info, "io_read")?;
    let port = parse::parse_u64(&argv[1])?;
    let mut file = device::open_and_seek(Path::new(DEVICE), port, false)?;
    let value = device::read_sized(&mut file, width)?;
    println!("{value}");
    Ok(0)
}

fn write(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = port_width(info, "io_write")?;
    let port = parse::parse_u64(&argv[1])?;
    let data = SizedValue::truncate_from(width, parse::parse_u64(&argv[2])?);
    let mut file = device::open_and_seek(Path::new(DEVICE), port, true)?;
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
    let rd = PrereqSpec::privileged(2, "<io_addr>", IOPL_LEVEL);
    let wr = PrereqSpec::privileged(3, "<io_addr> <data>", IOPL_LEVEL);

    CommandGroup::new(
        "IO",
        Some("commands to access registers in the IO address space"),
        vec![
            CommandDescriptor::with_prereqs(
                "io_read8",
                read_entry,
                CommandConfig::Width(Width::W8),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "io_write8",
                write_entry,
                CommandConfig::Width(Width::W8),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "io_read16",
                read_entry,
                CommandConfig::Width(Width::W16),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "io_write16",
                write_entry,
                CommandConfig::Width(Width::W16),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "io_read32",
                read_entry,
                CommandConfig::Width(Width::W32),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "io_write32",
                write_entry,
                CommandConfig::Width(Width::W32),
                wr,
            ),
        ],
    )
}
