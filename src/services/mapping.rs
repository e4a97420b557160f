//! Scoped mappings of physical memory through `/dev/mem`.
//!
//! The requested address is aligned down to a page boundary for `mmap`; the
//! in-page remainder is re-applied on every access. Accesses are volatile:
//! MMIO registers may have side effects and must not be elided or reordered
//! by the compiler, and are expected to be naturally aligned for the access
//! width, as the hardware requires. The mapping and its file descriptor are
//! released when the value drops, on every exit path.

use crate::value::{SizedValue, Width};
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr;

pub struct MemMapping {
    base: *mut libc::c_void,
    len: usize,
    offset: usize,
    _file: File,
}

impl MemMapping {
    pub fn open(addr: u64, bytes: usize, write: bool) -> anyhow::Result<Self> {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
        let offset = (addr & (page - 1)) as usize;
        let aligned = addr & !(page - 1);

        let mut opts = OpenOptions::new();
        opts.read(true).custom_flags(libc::O_SYNC);
        if write {
            opts.write(true);
        }
        let file = opts.open("/dev/mem").context("open(/dev/mem)")?;

        let len = bytes + offset;
        let mut prot = libc::PROT_READ;
        if write {
            prot |= libc::PROT_WRITE;
        }
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                prot,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned as libc::off_t,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(io::Error::last_os_error()).context("mmap(/dev/mem)");
        }

        Ok(MemMapping {
            base,
            len,
            offset,
            _file: file,
        })
    }

    fn target(&self, byte_off: usize) -> *mut u8 {
        // Callers stay within the `bytes` they asked open() to cover.
        unsafe { (self.base as *mut u8).add(self.offset + byte_off) }
    }

    pub fn read(&self, width: Width) -> SizedValue {
        unsafe {
            match width {
                Width::W8 => SizedValue::U8(ptr::read_volatile(self.target(0))),
                Width::W16 => SizedValue::U16(ptr::read_volatile(self.target(0) as *const u16)),
                Width::W32 => SizedValue::U32(ptr::read_volatile(self.target(0) as *const u32)),
                Width::W64 => SizedValue::U64(ptr::read_volatile(self.target(0) as *const u64)),
            }
        }
    }

    pub fn write(&self, value: SizedValue) {
        unsafe {
            match value {
                SizedValue::U8(v) => ptr::write_volatile(self.target(0), v),
                SizedValue::U16(v) => ptr::write_volatile(self.target(0) as *mut u16, v),
                SizedValue::U32(v) => ptr::write_volatile(self.target(0) as *mut u32, v),
                SizedValue::U64(v) => ptr::write_volatile(self.target(0) as *mut u64, v),
            }
        }
    }

    pub fn read_u32_at(&self, byte_off: usize) -> u32 {
        unsafe { ptr::read_volatile(self.target(byte_off) as *const u32) }
    }

    pub fn read_u8_at(&self, byte_off: usize) -> u8 {
        unsafe { ptr::read_volatile(self.target(byte_off)) }
    }
}

impl Drop for MemMapping {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base, self.len);
        }
    }
}
