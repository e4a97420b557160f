//! CPU model-specific register access through the msr driver.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::device;
use crate::value::{SizedValue, Width};
use std::path::PathBuf;

fn msr_path(cpu: u64) -> PathBuf {
    PathBuf::from(format!("/dev/cpu/{cpu}/msr"))
}

fn read(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let cpu = parse::parse_u64(&argv[1])?;
    let msr = parse::parse_u64(&argv[2])?;
    let mut file = device::open_and_seek(&msr_path(cpu), msr, false)?;
    let value = device::read_sized(&mut file, Width::W64)?;
    println!("{value}");
    Ok(0)
}

fn write(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let cpu = parse::parse_u64(&argv[1])?;
    let msr = parse::parse_u64(&argv[2])?;
    let data = SizedValue::truncate_from(Width::W64, parse::parse_u64(&argv[3])?);
    let mut file = device::open_and_seek(&msr_path(cpu), msr, true)?;
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
        "MSR",
        Some("commands to access CPU model specific registers"),
        vec![
            CommandDescriptor::with_prereqs(
                "rdmsr",
                read_entry,
                CommandConfig::None,
                PrereqSpec::exact(3, "<cpu> <msr>"),
            ),
            CommandDescriptor::with_prereqs(
                "wrmsr",
                write_entry,
                CommandConfig::None,
                PrereqSpec::exact(4, "<cpu> <msr> <data>"),
            ),
        ],
    )
}
