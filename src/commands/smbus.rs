//! System management bus access through i2c-dev.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::smbus::{SmbusDevice, SmbusSize, BLOCK_MAX};
use crate::value::{SizedValue, Width};
use anyhow::Context;

struct Target {
    device: SmbusDevice,
    reg: u8,
}

/// Shared argv prologue for reads and writes: adapter, address, and the
/// register for every transfer kind that issues a command code.
fn open_target(argv: &[String], size: SmbusSize) -> anyhow::Result<Target> {
    let adapter = parse::parse_u8(&argv[1]).context("invalid adapter value")?;
    let address = parse::parse_u8(&argv[2]).context("invalid address value")?;
    let reg = match size {
        SmbusSize::Byte | SmbusSize::Quick => 0,
        _ => parse::parse_u8(&argv[3]).context("invalid register value")?,
    };
    let device = SmbusDevice::open(adapter, address)?;
    Ok(Target { device, reg })
}

fn read_context(size: SmbusSize, target: &Target) -> String {
    match size {
        SmbusSize::Byte => format!("can't read from device 0x{:02x}", target.device.address()),
        _ => format!("can't read register 0x{:02x}", target.reg),
    }
}

fn write_context(size: SmbusSize, target: &Target) -> String {
    match size {
        SmbusSize::Byte | SmbusSize::Quick => {
            format!("can't write to device 0x{:02x}", target.device.address())
        }
        _ => format!("can't write register 0x{:02x}", target.reg),
    }
}

fn read(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let Some(size) = info.config.smbus() else {
        anyhow::bail!("invalid smbus read entry");
    };
    let target = open_target(argv, size)?;
    let ctx = || read_context(size, &target);

    match size {
        SmbusSize::W8 => {
            let v = target.device.read_byte_data(target.reg).with_context(ctx)?;
            println!("{}", SizedValue::U8(v));
        }
        SmbusSize::W16 => {
            let v = target.device.read_word_data(target.reg).with_context(ctx)?;
            println!("{}", SizedValue::U16(v));
        }
        SmbusSize::W32 => {
            let bytes = target.device.read_i2c_block(target.reg, 4).with_context(ctx)?;
            let mut buf = [0u8; 8];
            buf[..4].copy_from_slice(&bytes);
            println!("{}", SizedValue::from_ne_bytes(Width::W32, &buf));
        }
        SmbusSize::W64 => {
            let bytes = target.device.read_i2c_block(target.reg, 8).with_context(ctx)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            println!("{}", SizedValue::from_ne_bytes(Width::W64, &buf));
        }
        SmbusSize::Block => {
            let bytes = target.device.read_block(target.reg).with_context(ctx)?;
            let line: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            println!("{line}");
        }
        SmbusSize::Byte => {
            let v = target.device.read_byte().with_context(ctx)?;
            println!("{}", SizedValue::U8(v));
        }
        SmbusSize::Quick => anyhow::bail!("illegal SMBus size for read operation"),
    }

    Ok(0)
}

/// Even-length hex string of at most `BLOCK_MAX` bytes, no prefix.
fn parse_block_value(arg: &str) -> anyhow::Result<Vec<u8>> {
    if arg.is_empty() || arg.len() % 2 != 0 || arg.len() / 2 > BLOCK_MAX {
        anyhow::bail!(
            "'{arg}': block length is 0, odd, or over {BLOCK_MAX} bytes"
        );
    }
    arg.as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("non-ascii block value")?;
            Ok(parse::parse_hex_byte(pair)?)
        })
        .collect()
}

fn write(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let Some(size) = info.config.smbus() else {
        anyhow::bail!("invalid smbus write entry");
    };
    let target = open_target(argv, size)?;

    // The value sits after the register except for the register-less kinds.
    let value_arg = match size {
        SmbusSize::Byte | SmbusSize::Quick => &argv[3],
        _ => &argv[4],
    };

    // Drivers may already own the device; writes rebind deliberately.
    target
        .device
        .force_address()
        .with_context(|| format!("can't set address 0x{:02x}", target.device.address()))?;

    let ctx = || write_context(size, &target);
    match size {
        SmbusSize::W8 => {
            let data = SizedValue::truncate_from(Width::W8, parse::parse_u64(value_arg)?);
            target
                .device
                .write_byte_data(target.reg, data.get() as u8)
                .with_context(ctx)?;
        }
        SmbusSize::W16 => {
            let data = SizedValue::truncate_from(Width::W16, parse::parse_u64(value_arg)?);
            target
                .device
                .write_word_data(target.reg, data.get() as u16)
                .with_context(ctx)?;
        }
        SmbusSize::W32 => {
            let data = SizedValue::truncate_from(Width::W32, parse::parse_u64(value_arg)?);
            let mut buf = [0u8; 8];
            let len = data.fill_ne_bytes(&mut buf);
            target
                .device
                .write_i2c_block(target.reg, &buf[..len])
                .with_context(ctx)?;
        }
        SmbusSize::W64 => {
            let data = SizedValue::truncate_from(Width::W64, parse::parse_u64(value_arg)?);
            let mut buf = [0u8; 8];
            let len = data.fill_ne_bytes(&mut buf);
            target
                .device
                .write_i2c_block(target.reg, &buf[..len])
                .with_context(ctx)?;
        }
        SmbusSize::Block => {
            let bytes = parse_block_value(value_arg)?;
            target
                .device
                .write_block(target.reg, &bytes)
                .with_context(ctx)?;
        }
        SmbusSize::Byte => {
            let data = SizedValue::truncate_from(Width::W8, parse::parse_u64(value_arg)?);
            target
                .device
                .write_byte(data.get() as u8)
                .with_context(ctx)?;
        }
        SmbusSize::Quick => {
            let bit = parse::parse_u64(value_arg)?;
            if bit > 1 {
                anyhow::bail!("'{value_arg}': isn't 0 or 1");
            }
            target.device.write_quick(bit as u8).with_context(ctx)?;
        }
    }

    Ok(0)
}

fn read_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(read(argv, info))
}

fn write_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(write(argv, info))
}

pub fn group() -> CommandGroup {
    let rd = PrereqSpec::exact(4, "<adapter> <address> <register>");
    let wr = PrereqSpec::exact(5, "<adapter> <address> <register> <value>");

    let mut commands = vec![
        CommandDescriptor::with_prereqs(
            "smbus_read8",
            read_entry,
            CommandConfig::Smbus(SmbusSize::W8),
            rd,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_write8",
            write_entry,
            CommandConfig::Smbus(SmbusSize::W8),
            wr,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_read16",
            read_entry,
            CommandConfig::Smbus(SmbusSize::W16),
            rd,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_write16",
            write_entry,
            CommandConfig::Smbus(SmbusSize::W16),
            wr,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_read32",
            read_entry,
            CommandConfig::Smbus(SmbusSize::W32),
            rd,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_write32",
            write_entry,
            CommandConfig::Smbus(SmbusSize::W32),
            wr,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_read64",
            read_entry,
            CommandConfig::Smbus(SmbusSize::W64),
            rd,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_write64",
            write_entry,
            CommandConfig::Smbus(SmbusSize::W64),
            wr,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_readblock",
            read_entry,
            CommandConfig::Smbus(SmbusSize::Block),
            rd,
        ),
        CommandDescriptor::with_prereqs(
            "smbus_writeblock",
            write_entry,
            CommandConfig::Smbus(SmbusSize::Block),
            wr,
        ),
    ];
    commands.push(CommandDescriptor::with_prereqs(
        "smbus_receive_byte",
        read_entry,
        CommandConfig::Smbus(SmbusSize::Byte),
        PrereqSpec::exact(3, "<adapter> <address>"),
    ));
    commands.push(CommandDescriptor::with_prereqs(
        "smbus_send_byte",
        write_entry,
        CommandConfig::Smbus(SmbusSize::Byte),
        PrereqSpec::exact(4, "<adapter> <address> <value>"),
    ));
    commands.push(CommandDescriptor::with_prereqs(
        "smbus_quick",
        write_entry,
        CommandConfig::Smbus(SmbusSize::Quick),
        PrereqSpec::exact(4, "<adapter> <address> <0|1>"),
    ));

    CommandGroup::new(
        "SMBus",
        Some("commands to access the system management bus"),
        commands,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_values_parse_in_byte_pairs() {
        assert_eq!(parse_block_value("0a1b2c").unwrap(), vec![0x0a, 0x1b, 0x2c]);
        assert!(parse_block_value("").is_err());
        assert!(parse_block_value("abc").is_err());
        assert!(parse_block_value(&"ff".repeat(BLOCK_MAX + 1)).is_err());
        assert!(parse_block_value("zz").is_err());
    }
}
