//! Pinning the process to one CPU, for commands whose effect is per-CPU.

use anyhow::Context;
use std::io;
use std::mem;

pub fn pin_to_cpu(cpu: usize) -> anyhow::Result<()> {
    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        if libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) < 0 {
            return Err(io::Error::last_os_error()).context("sched_setaffinity()");
        }
    }
    Ok(())
}
