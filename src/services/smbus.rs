//! SMBus transfers over the Linux i2c-dev interface.
//!
//! The kernel exposes SMBus protocol operations through the `I2C_SMBUS`
//! ioctl on `/dev/i2c-N`; this module carries the ioctl structures and wraps
//! each transfer type the command group needs. The device handle closes on
//! drop.

use anyhow::Context;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Transfer kind an SMBus command is configured with. The first four issue a
/// register ("command code") before moving a value of that width; `Block`
/// moves a counted byte string; `Byte` and `Quick` address the device
/// without a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmbusSize {
    W8,
    W16,
    W32,
    W64,
    Block,
    Byte,
    Quick,
}

pub const BLOCK_MAX: usize = 32;

const I2C_SLAVE: libc::c_ulong = 0x0703;
const I2C_SLAVE_FORCE: libc::c_ulong = 0x0706;
const I2C_SMBUS: libc::c_ulong = 0x0720;

const I2C_SMBUS_WRITE: u8 = 0;
const I2C_SMBUS_READ: u8 = 1;

const I2C_SMBUS_QUICK: u32 = 0;
const I2C_SMBUS_BYTE: u32 = 1;
const I2C_SMBUS_BYTE_DATA: u32 = 2;
const I2C_SMBUS_WORD_DATA: u32 = 3;
const I2C_SMBUS_BLOCK_DATA: u32 = 5;
const I2C_SMBUS_I2C_BLOCK_DATA: u32 = 8;

/// Kernel's `union i2c_smbus_data`: byte and word overlay the head of the
/// block buffer, block transfers carry a length byte first.
#[repr(C)]
struct SmbusData {
    block: [u8; BLOCK_MAX + 2],
}

impl SmbusData {
    fn zeroed() -> Self {
        SmbusData {
            block: [0; BLOCK_MAX + 2],
        }
    }

    fn word(&self) -> u16 {
        u16::from_ne_bytes([self.block[0], self.block[1]])
    }

    fn set_word(&mut self, value: u16) {
        self.block[..2].copy_from_slice(&value.to_ne_bytes());
    }
}

#[repr(C)]
struct SmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut SmbusData,
}

pub struct SmbusDevice {
    file: std::fs::File,
    address: u8,
}

impl SmbusDevice {
    pub fn open(adapter: u8, address: u8) -> anyhow::Result<Self> {
        let path = format!("/dev/i2c-{adapter}");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("open(\"{path}\")"))?;

        if unsafe { libc::ioctl(file.as_raw_fd(), I2C_SLAVE, libc::c_ulong::from(address)) } < 0 {
            return Err(io::Error::last_os_error()).with_context(|| {
                format!("can't attach to i2c bus {adapter} slave address 0x{address:02x}")
            });
        }

        Ok(SmbusDevice { file, address })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Re-bind the slave address even if a driver claims it. Writes go
    /// through this so they reach devices the kernel already owns.
    pub fn force_address(&self) -> io::Result<()> {
        let fd = self.file.as_raw_fd();
        if unsafe { libc::ioctl(fd, I2C_SLAVE_FORCE, libc::c_ulong::from(self.address)) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn transfer(
        &self,
        read_write: u8,
        command: u8,
        size: u32,
        data: Option<&mut SmbusData>,
    ) -> io::Result<()> {
        let mut msg = SmbusIoctlData {
            read_write,
            command,
            size,
            data: data.map_or(std::ptr::null_mut(), |d| d as *mut SmbusData),
        };
        if unsafe { libc::ioctl(self.fd(), I2C_SMBUS, &mut msg) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn read_byte(&self) -> io::Result<u8> {
        let mut data = SmbusData::zeroed();
        self.transfer(I2C_SMBUS_READ, 0, I2C_SMBUS_BYTE, Some(&mut data))?;
        Ok(data.block[0])
    }

    pub fn read_byte_data(&self, reg: u8) -> io::Result<u8> {
        let mut data = SmbusData::zeroed();
        self.transfer(I2C_SMBUS_READ, reg, I2C_SMBUS_BYTE_DATA, Some(&mut data))?;
        Ok(data.block[0])
    }

    pub fn read_word_data(&self, reg: u8) -> io::Result<u16> {
        let mut data = SmbusData::zeroed();
        self.transfer(I2C_SMBUS_READ, reg, I2C_SMBUS_WORD_DATA, Some(&mut data))?;
        Ok(data.word())
    }

    /// Fixed-length I2C block read; `len` is at most `BLOCK_MAX`.
    pub fn read_i2c_block(&self, reg: u8, len: usize) -> io::Result<Vec<u8>> {
        let mut data = SmbusData::zeroed();
        data.block[0] = len as u8;
        self.transfer(I2C_SMBUS_READ, reg, I2C_SMBUS_I2C_BLOCK_DATA, Some(&mut data))?;
        let got = usize::from(data.block[0]).min(BLOCK_MAX);
        if got < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short block read: {got} of {len} bytes"),
            ));
        }
        Ok(data.block[1..1 + len].to_vec())
    }

    /// Counted block read; the device reports the length.
    pub fn read_block(&self, reg: u8) -> io::Result<Vec<u8>> {
        let mut data = SmbusData::zeroed();
        self.transfer(I2C_SMBUS_READ, reg, I2C_SMBUS_BLOCK_DATA, Some(&mut data))?;
        let len = usize::from(data.block[0]).min(BLOCK_MAX);
        Ok(data.block[1..1 + len].to_vec())
    }

    pub fn write_byte(&self, value: u8) -> io::Result<()> {
        self.transfer(I2C_SMBUS_WRITE, value, I2C_SMBUS_BYTE, None)
    }

    pub fn write_byte_data(&self, reg: u8, value: u8) -> io::Result<()> {
        let mut data = SmbusData::zeroed();
        data.block[0] = value;
        self.transfer(I2C_SMBUS_WRITE, reg, I2C_SMBUS_BYTE_DATA, Some(&mut data))
    }

    pub fn write_word_data(&self, reg: u8, value: u16) -> io::Result<()> {
        let mut data = SmbusData::zeroed();
        data.set_word(value);
        self.transfer(I2C_SMBUS_WRITE, reg, I2C_SMBUS_WORD_DATA, Some(&mut data))
    }

    pub fn write_i2c_block(&self, reg: u8, bytes: &[u8]) -> io::Result<()> {
        let mut data = SmbusData::zeroed();
        data.block[0] = bytes.len() as u8;
        data.block[1..1 + bytes.len()].copy_from_slice(bytes);
        self.transfer(I2C_SMBUS_WRITE, reg, I2C_SMBUS_I2C_BLOCK_DATA, Some(&mut data))
    }

    pub fn write_block(&self, reg: u8, bytes: &[u8]) -> io::Result<()> {
        let mut data = SmbusData::zeroed();
        data.block[0] = bytes.len() as u8;
        data.block[1..1 + bytes.len()].copy_from_slice(bytes);
        self.transfer(I2C_SMBUS_WRITE, reg, I2C_SMBUS_BLOCK_DATA, Some(&mut data))
    }

    /// Quick transaction: the transfer direction bit is the payload.
    pub fn write_quick(&self, bit: u8) -> io::Result<()> {
        self.transfer(bit, 0, I2C_SMBUS_QUICK, None)
    }
}
