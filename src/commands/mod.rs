//! Command group implementations.
//!
//! ## Files
//! - `cmos.rs` — CMOS bytes through the nvram driver.
//! - `ioport.rs` — I/O address space through `/dev/port`.
//! - `mmio.rs` — physical memory reads/writes/dumps through `/dev/mem`.
//! - `pci.rs` — PCI configuration space through sysfs (procfs fallback).
//! - `msr.rs` — CPU model-specific registers through the msr driver.
//! - `scom.rs` — POWER SCOM registers through debugfs.
//! - `smbus.rs` — system management bus devices through i2c-dev.
//! - `logic.rs` — boolean algebra helpers for scripting.
//! - `misc.rs` — CPU utilities (tsc, cpuid, affinity, busy loop).
//!
//! ## Principles
//! - Parse argv and print results here.
//! - Delegate syscalls and resource ownership to `services/*`.
//! - Entries translate errors into the signed status contract; services
//!   propagate them with context.

pub mod cmos;
pub mod ioport;
pub mod logic;
pub mod misc;
pub mod mmio;
pub mod msr;
pub mod pci;
pub mod scom;
pub mod smbus;

use crate::registry::Registry;

/// Build every backend's group and register it. Runs once, before dispatch.
pub fn register_all(registry: &mut Registry) {
    registry.register(cmos::group());
    registry.register(ioport::group());
    registry.register(mmio::group());
    registry.register(pci::group());
    registry.register(msr::group());
    registry.register(scom::group());
    registry.register(smbus::group());
    registry.register(logic::group());
    registry.register(misc::group());
}

/// Boundary between fallible command bodies and the signed entry contract.
pub(crate) fn report(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{err:#}");
            -1
        }
    }
}
