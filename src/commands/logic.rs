//! Boolean algebra helpers.
//!
//! These exist for shell scripts that post-process register values. Their
//! exit status doubles as a predicate: `or`/`and`/`xor`/`not` exit non-zero
//! when the result is zero, `bts`/`btr` exit non-zero when the tested bit
//! was already set. Scripts branch on that, so it must stay.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    Or,
    And,
    Xor,
    Shl,
    Shr,
    Bts,
    Btr,
}

fn fold(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let Some(op) = info.config.logic() else {
        anyhow::bail!("invalid logic entry");
    };

    let mut result = parse::parse_u64(&argv[1])?;
    let mut rc = 0;
    for arg in &argv[2..] {
        let mut val = parse::parse_u64(arg)?;
        match op {
            LogicOp::Or => {
                result |= val;
                rc = i32::from(result == 0);
            }
            LogicOp::And => {
                result &= val;
                rc = i32::from(result == 0);
            }
            LogicOp::Xor => {
                result ^= val;
                rc = i32::from(result == 0);
            }
            LogicOp::Bts => {
                val = 1u64.wrapping_shl(val as u32);
                rc = i32::from(result & val != 0);
                result |= val;
            }
            LogicOp::Btr => {
                val = 1u64.wrapping_shl(val as u32);
                rc = i32::from(result & val != 0);
                result &= !val;
            }
            LogicOp::Shl | LogicOp::Shr => anyhow::bail!("invalid logic op"),
        }
    }

    println!("0x{result:x}");
    Ok(rc)
}

fn not(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let result = !parse::parse_u64(&argv[1])?;
    println!("0x{result:x}");
    Ok(i32::from(result == 0))
}

fn shift(argv: &[String], info: &CommandDescriptor) -> anyhow::Result<i32> {
    let val = parse::parse_u64(&argv[1])?;
    let amount = parse::parse_u64(&argv[2])?;
    let result = match info.config.logic() {
        Some(LogicOp::Shl) => val.wrapping_shl(amount as u32),
        Some(LogicOp::Shr) => val.wrapping_shr(amount as u32),
        _ => anyhow::bail!("invalid shift operation"),
    };
    println!("0x{result:x}");
    Ok(0)
}

fn fold_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(fold(argv, info))
}

fn not_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(not(argv, info))
}

fn shift_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(shift(argv, info))
}

pub fn group() -> CommandGroup {
    let fold_args = PrereqSpec::range(2, usize::MAX, "<value> <value> ...");
    let shift_args = PrereqSpec::exact(3, "<value> <shift>");
    let bit_args = PrereqSpec::exact(3, "<value> <bit>");

    CommandGroup::new(
        "LOGIC",
        Some("commands to perform boolean algebra operations"),
        vec![
            CommandDescriptor::with_prereqs(
                "or",
                fold_entry,
                CommandConfig::Logic(LogicOp::Or),
                fold_args,
            ),
            CommandDescriptor::with_prereqs(
                "and",
                fold_entry,
                CommandConfig::Logic(LogicOp::And),
                fold_args,
            ),
            CommandDescriptor::with_prereqs(
                "xor",
                fold_entry,
                CommandConfig::Logic(LogicOp::Xor),
                fold_args,
            ),
            CommandDescriptor::with_prereqs(
                "shl",
                shift_entry,
                CommandConfig::Logic(LogicOp::Shl),
                shift_args,
            ),
            CommandDescriptor::with_prereqs(
                "shr",
                shift_entry,
                CommandConfig::Logic(LogicOp::Shr),
                shift_args,
            ),
            CommandDescriptor::with_prereqs(
                "not",
                not_entry,
                CommandConfig::None,
                PrereqSpec::exact(2, "<value>"),
            ),
            CommandDescriptor::with_prereqs(
                "btr",
                fold_entry,
                CommandConfig::Logic(LogicOp::Btr),
                bit_args,
            ),
            CommandDescriptor::with_prereqs(
                "bts",
                fold_entry,
                CommandConfig::Logic(LogicOp::Bts),
                bit_args,
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn descriptor(op: LogicOp) -> CommandDescriptor {
        CommandDescriptor::new("test", fold_entry, CommandConfig::Logic(op))
    }

    #[test]
    fn fold_accumulates_left_to_right() {
        let info = descriptor(LogicOp::Or);
        assert_eq!(fold(&argv(&["or", "0x10", "0x01", "0x02"]), &info).ok(), Some(0));
    }

    #[test]
    fn predicate_reflects_a_zero_result() {
        let info = descriptor(LogicOp::And);
        assert_eq!(fold(&argv(&["and", "0xf0", "0x0f"]), &info).ok(), Some(1));
        assert_eq!(fold(&argv(&["and", "0xff", "0x0f"]), &info).ok(), Some(0));
    }

    #[test]
    fn bit_test_reports_the_previous_state() {
        let set = descriptor(LogicOp::Bts);
        assert_eq!(fold(&argv(&["bts", "0x8", "3"]), &set).ok(), Some(1));
        assert_eq!(fold(&argv(&["bts", "0x0", "3"]), &set).ok(), Some(0));

        let clear = descriptor(LogicOp::Btr);
        assert_eq!(fold(&argv(&["btr", "0x8", "3"]), &clear).ok(), Some(1));
        assert_eq!(fold(&argv(&["btr", "0x0", "3"]), &clear).ok(), Some(0));
    }
}
