//! Side-effect helpers shared by the command groups.
//!
//! ## Service map
//! - `device.rs` — open/seek/fixed-width read and write on device files.
//! - `mapping.rs` — scoped `/dev/mem` mappings for MMIO access.
//! - `smbus.rs` — i2c-dev ioctl plumbing for SMBus transfers.
//! - `privilege.rs` — I/O privilege level elevation.
//! - `affinity.rs` — pinning the process to one CPU.
//! - `links.rs` — per-command symlink housekeeping next to the binary.
//!
//! ## Conventions
//! - Resources are owned by the call that opened them and released on every
//!   exit path.
//! - Keep command handlers thin; argument parsing and printing stay there,
//!   syscalls live here.

pub mod affinity;
pub mod device;
pub mod links;
pub mod mapping;
pub mod privilege;
pub mod smbus;
