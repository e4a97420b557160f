//! CPU utilities that round out register poking sessions: timestamp
//! counter, cpuid, affinity-pinned exec, and a calibration busy loop.

use crate::commands::report;
use crate::parse;
use crate::registry::{CommandConfig, CommandDescriptor, CommandGroup, PrereqSpec};
use crate::services::affinity;
use anyhow::Context;
use std::time::{Duration, Instant};

#[cfg(target_arch = "x86_64")]
fn rdtsc(_argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let tsc = unsafe { std::arch::x86_64::_rdtsc() };
    println!("0x{tsc:016x}");
    Ok(0)
}

#[cfg(target_arch = "x86_64")]
fn cpuid(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let cpu = parse::parse_usize(&argv[1])?;
    let function = parse::parse_u32(&argv[2])?;
    let index = match argv.get(3) {
        Some(arg) => parse::parse_u32(arg)?,
        None => 0,
    };

    // CPUID reads the CPU it runs on, so pin there first.
    affinity::pin_to_cpu(cpu)?;
    let leaf = unsafe { std::arch::x86_64::__cpuid_count(function, index) };
    println!(
        "0x{:08x} 0x{:08x} 0x{:08x} 0x{:08x}",
        leaf.eax, leaf.ebx, leaf.ecx, leaf.edx
    );
    Ok(0)
}

/// Count loop iterations per second, forever or for `reps` reports.
fn busy_loop(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let reps = match argv.get(1) {
        Some(arg) => Some(parse::parse_u64(arg)?),
        None => None,
    };

    let mut printed = 0u64;
    let mut count = 0u64;
    let mut start = Instant::now();
    loop {
        count += 1;
        if count % 16384 == 0 && start.elapsed() >= Duration::from_secs(1) {
            println!("{count}");
            start = Instant::now();
            count = 0;
            if let Some(reps) = reps {
                printed += 1;
                if printed >= reps {
                    break;
                }
            }
        }
    }
    Ok(0)
}

fn cpu_list(_argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    let ncpus = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if ncpus < 0 {
        anyhow::bail!("operation not supported by library");
    }
    for cpu in 0..ncpus {
        println!("{cpu}");
    }
    Ok(0)
}

/// Pin to the requested CPU and exec the rest of the argv in place. Returns
/// only when the exec itself fails.
fn runon(argv: &[String], _info: &CommandDescriptor) -> anyhow::Result<i32> {
    use std::os::unix::process::CommandExt;

    let cpu = parse::parse_usize(&argv[1])?;
    affinity::pin_to_cpu(cpu)?;

    let err = std::process::Command::new(&argv[2]).args(&argv[3..]).exec();
    Err(err).with_context(|| format!("exec(\"{}\")", argv[2]))
}

#[cfg(target_arch = "x86_64")]
fn rdtsc_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(rdtsc(argv, info))
}

#[cfg(target_arch = "x86_64")]
fn cpuid_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(cpuid(argv, info))
}

fn busy_loop_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(busy_loop(argv, info))
}

fn cpu_list_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(cpu_list(argv, info))
}

fn runon_entry(argv: &[String], info: &CommandDescriptor) -> i32 {
    report(runon(argv, info))
}

pub fn group() -> CommandGroup {
    let mut commands = Vec::new();

    #[cfg(target_arch = "x86_64")]
    {
        commands.push(CommandDescriptor::new(
            "rdtsc",
            rdtsc_entry,
            CommandConfig::None,
        ));
        commands.push(CommandDescriptor::with_prereqs(
            "cpuid",
            cpuid_entry,
            CommandConfig::None,
            PrereqSpec::range(3, 4, "<cpu> <function> [index]"),
        ));
    }

    commands.push(CommandDescriptor::new(
        "busy_loop",
        busy_loop_entry,
        CommandConfig::None,
    ));
    commands.push(CommandDescriptor::new(
        "cpu_list",
        cpu_list_entry,
        CommandConfig::None,
    ));
    commands.push(CommandDescriptor::with_prereqs(
        "runon",
        runon_entry,
        CommandConfig::None,
        PrereqSpec::range(3, usize::MAX, "<cpu> <cmd> [args]"),
    ));

    CommandGroup::new("MISC", None, commands)
}
