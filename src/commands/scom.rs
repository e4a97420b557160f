//! POWER SCOM register access through the kernel's debugfs interface, plus
//! the CPU-number-to-chip translation helpers that make it usable.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::device;
use crate::value::{SizedValue, Width};
use anyhow::Context;
use std::path::PathBuf;

fn access_path(chip: u32) -> PathBuf {
    PathBuf::from(format!("/sys/kernel/debug/powerpc/scom/{chip:08x}/access"))
}

/// SCOM addresses map to file offsets shifted left by 3. The indirect-SCOM
/// flag in bit 63 lands in offset bit 62: the kernel shifts the offset right
/// 3 before testing the flag.
fn scom_offset(scom: u64) -> u64 {
    let mut offset = (scom & ((1u64 << 63) - 1)).wrapping_shl(3);
    if scom & (1 << 63) != 0 {
        offset |= 1 << 62;
    }
    offset
}

fn read(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let chip = parse::parse_u32(&argv[1])?;
    let scom = parse::parse_u64(&argv[2])?;
    let mut file = device::open_and_seek(&access_path(chip), scom_offset(scom), false)?;
    let value = device::read_sized(&mut file, Width::W64)?;
    println!("{value}");
    Ok(0)
}

fn write(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let chip = parse::parse_u32(&argv[1])?;
    let scom = parse::parse_u64(&argv[2])?;
    let data = SizedValue::truncate_from(Width::W64, parse::parse_u64(&argv[3])?);
    let mut file = device::open_and_seek(&access_path(chip), scom_offset(scom), true)?;
    device::write_sized(&mut file, data)?;
    Ok(0)
}

/// Processor Identification Register for a Linux CPU number, exposed by
/// sysfs as hex text.
fn cpu_pir(cpu: u64) -> anyhow::Result<u32> {
    let path = format!("/sys/devices/system/cpu/cpu{cpu}/pir");
    let text = std::fs::read_to_string(&path).with_context(|| format!("open(\"{path}\")"))?;
    u32::from_str_radix(text.trim(), 16).with_context(|| format!("unparsable PIR in {path}"))
}

fn pir_chipid(pir: u32) -> anyhow::Result<u32> {
    let cpus_dir = "/proc/device-tree/cpus";
    let suffix = format!("@{pir:x}");
    for entry in std::fs::read_dir(cpus_dir).with_context(|| format!("open(\"{cpus_dir}\")"))? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().ends_with(&suffix) {
            continue;
        }
        let raw = std::fs::read(entry.path().join("ibm,chip-id"))
            .with_context(|| format!("read(\"{}/ibm,chip-id\")", entry.path().display()))?;
        let bytes: [u8; 4] = raw
            .get(..4)
            .context("truncated ibm,chip-id")?
            .try_into()?;
        return Ok(u32::from_ne_bytes(bytes));
    }
    anyhow::bail!("no device-tree cpu node for PIR 0x{pir:x}")
}

fn cpu_to_chipid(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let cpu = parse::parse_u64(&argv[1])?;
    let chipid = pir_chipid(cpu_pir(cpu)?)?;
    println!("0x{chipid:08x}");
    Ok(0)
}

fn cpu_to_ex(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let cpu = parse::parse_u64(&argv[1])?;
    let pir = cpu_pir(cpu)?;
    // The EX number is the 4-bit core id inside the PIR.
    println!("{}", (pir >> 3) & 0xf);
    Ok(0)
}

fn read_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(read(argv, info))
}

fn write_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(write(argv, info))
}

fn chipid_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(cpu_to_chipid(argv, info))
}

fn ex_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(cpu_to_ex(argv, info))
}

pub fn group() -> CommandGroup {
    let cpu = PrereqSpec::exact(2, "<cpu>");

    CommandGroup::new(
        "SCOM",
        Some("commands to access SCOM registers"),
        vec![
            CommandDescriptor::with_prereqs(
                "getscom",
                read_entry,
                CommandConfig::None,
                PrereqSpec::exact(3, "<chipid> <scom>"),
            ),
            CommandDescriptor::with_prereqs(
                "putscom",
                write_entry,
                CommandConfig::None,
                PrereqSpec::exact(4, "<chipid> <scom> <data>"),
            ),
            CommandDescriptor::with_prereqs("cputochipid", chipid_entry, CommandConfig::None, cpu),
            CommandDescriptor::with_prereqs("cputoex", ex_entry, CommandConfig::None, cpu),
        ],
    )
}
