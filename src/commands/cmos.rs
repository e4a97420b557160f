//! CMOS access through the Linux nvram driver.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::device;
use crate::value::{SizedValue, Width};
use std::path::Path;

const DEVICE: &str = "/dev/nvram";
/// The driver hides the first 14 bytes; they belong to the RTC.
const NVRAM_OFFSET: u64 = 14;

fn checked_index(arg: &str, what: &str) -> anyhow::Result<u64> {
    let index = parse::parse_u64(arg)?;
    if index < NVRAM_OFFSET {
        anyhow::bail!("can't {what} bytes below {NVRAM_OFFSET}");
    }
    Ok(index - NVRAM_OFFSET)
}

fn read(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let index = checked_index(&argv[1], "read")?;
    let mut file = device::open_and_seek(Path::new(DEVICE), index, false)?;
    let value = device::read_sized(&mut file, Width::W8)?;
    println!("{value}");
    Ok(0)
}

fn write(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let index = checked_index(&argv[1], "write")?;
    let data = SizedValue::truncate_from(Width::W8, parse::parse_u64(&argv[2])?);
    let mut file = device::open_and_seek(Path::new(DEVICE), index, true)?;
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
    CommandGroup::new(
        "CMOS",
        Some("commands to access the CMOS registers"),
        vec![
            CommandDescriptor::with_prereqs(
                "cmos_read",
                read_entry,
                CommandConfig::None,
                PrereqSpec::exact(2, "<index>"),
            ),
            CommandDescriptor::with_prereqs(
                "cmos_write",
                write_entry,
                CommandConfig::None,
                PrereqSpec::exact(3, "<index> <data>"),
            ),
        ],
    )
}
