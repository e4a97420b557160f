//! Physical memory access through `/dev/mem`.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::mapping::MemMapping;
use crate::value::{SizedValue, Width};

fn mmio_width(info: &CommandDescriptor, what: &str) -> anyhow::Result<Width> {
    match info.config.width() {
        Some(width @ (Width::W8 | Width::W16 | Width::W32)) => Ok(width),
        _ => anyhow::bail!("invalid {what} parameter"),
    }
}

fn read(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = mmio_width(info, "mmio_read")?;
    let addr = parse::parse_u64(&argv[1])?;
    let mapping = MemMapping::open(addr, 8, false)?;
    println!("{}", mapping.read(width));
    Ok(0)
}

fn write(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let width = mmio_width(info, "mmio_write")?;
    let addr = parse::parse_u64(&argv[1])?;
    let data = SizedValue::truncate_from(width, parse::parse_u64(&argv[2])?);
    let mapping = MemMapping::open(addr, 8, true)?;
    mapping.write(data);
    Ok(0)
}

/// Hex dump: four 32-bit words per address-prefixed line, trailing bytes
/// printed singly.
fn dump(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let addr = parse::parse_u64(&argv[1])?;
    let bytes_to_dump = parse::parse_usize(&argv[2])?;
    let mapping = MemMapping::open(addr, bytes_to_dump, false)?;

    let mut off = 0usize;
    let mut fields_on_line = 0;
    while off < bytes_to_dump {
        if fields_on_line == 0 {
            print!("0x{:x}:", addr + off as u64);
        }

        let left = bytes_to_dump - off;
        if left < 4 {
            print!(" 0x{:02x}", mapping.read_u8_at(off));
            off += 1;
        } else {
            print!(" 0x{:08x}", mapping.read_u32_at(off));
            off += 4;
        }

        fields_on_line = (fields_on_line + 1) % 4;
        if fields_on_line == 0 {
            println!();
        }
    }
    if fields_on_line != 0 {
        println!();
    }

    Ok(0)
}

fn read_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(read(argv, info))
}

fn write_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(write(argv, info))
}

fn dump_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(dump(argv, info))
}

pub fn group() -> CommandGroup {
    let rd = PrereqSpec::exact(2, "<addr>");
    let wr = PrereqSpec::exact(3, "<addr> <value>");

    CommandGroup::new(
        "MMIO",
        Some("commands to access memory mapped address spaces"),
        vec![
            CommandDescriptor::with_prereqs(
                "mmio_read8",
                read_entry,
                CommandConfig::Width(Width::W8),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_write8",
                write_entry,
                CommandConfig::Width(Width::W8),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_read16",
                read_entry,
                CommandConfig::Width(Width::W16),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_write16",
                write_entry,
                CommandConfig::Width(Width::W16),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_read32",
                read_entry,
                CommandConfig::Width(Width::W32),
                rd,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_write32",
                write_entry,
                CommandConfig::Width(Width::W32),
                wr,
            ),
            CommandDescriptor::with_prereqs(
                "mmio_dump",
                dump_entry,
                CommandConfig::None,
                PrereqSpec::exact(3, "<addr> <num_bytes>"),
            ),
        ],
    )
}
