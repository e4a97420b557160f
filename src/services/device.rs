//! Fixed-width access to seekable device files.
//!
//! CMOS, PCI config space, MSRs, SCOMs, and port I/O all reduce to the same
//! shape: open a device file, seek to a register offset, move one value of
//! the tagged width. The file handle is owned by the caller's scope, so it
//! closes on every exit path.

use crate::value::{SizedValue, Width};
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub fn open_for(path: &Path, write: bool) -> anyhow::Result<File> {
    let mut opts = OpenOptions::new();
    if write {
        opts.write(true);
    } else {
        opts.read(true);
    }
    opts.open(path)
        .with_context(|| format!("open(\"{}\")", path.display()))
}

pub fn seek_to(file: &mut File, offset: u64) -> anyhow::Result<()> {
    file.seek(SeekFrom::Start(offset))
        .with_context(|| format!("lseek({offset})"))?;
    Ok(())
}

pub fn open_and_seek(path: &Path, offset: u64, write: bool) -> anyhow::Result<File> {
    let mut file = open_for(path, write)?;
    seek_to(&mut file, offset)?;
    Ok(file)
}

pub fn read_sized(file: &mut File, width: Width) -> anyhow::Result<SizedValue> {
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf[..width.bytes()]).context("read()")?;
    Ok(SizedValue::from_ne_bytes(width, &buf))
}

pub fn write_sized(file: &mut File, value: SizedValue) -> anyhow::Result<()> {
    let mut buf = [0u8; 8];
    let len = value.fill_ne_bytes(&mut buf);
    file.write_all(&buf[..len]).context("write()")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_round_trip_through_a_file() {
        let mut file = tempfile::tempfile().expect("tempfile");

        write_sized(&mut file, SizedValue::truncate_from(Width::W16, 0xABCD)).expect("write");
        seek_to(&mut file, 0).expect("seek");
        let read_back = read_sized(&mut file, Width::W16).expect("read");
        assert_eq!(read_back.get(), 0xABCD);

        seek_to(&mut file, 0).expect("seek");
        write_sized(&mut file, SizedValue::truncate_from(Width::W16, 0x1FFFF)).expect("write");
        seek_to(&mut file, 0).expect("seek");
        let truncated = read_sized(&mut file, Width::W16).expect("read");
        assert_eq!(truncated.get(), 0xFFFF);
    }

    #[test]
    fn reads_honor_the_seek_offset() {
        let mut file = tempfile::tempfile().expect("tempfile");
        write_sized(&mut file, SizedValue::truncate_from(Width::W32, 0x11223344)).expect("write");
        write_sized(&mut file, SizedValue::truncate_from(Width::W32, 0x55667788)).expect("write");

        seek_to(&mut file, 4).expect("seek");
        let second = read_sized(&mut file, Width::W32).expect("read");
        assert_eq!(second.get(), 0x55667788);
    }

    #[test]
    fn short_files_fail_the_read() {
        let mut file = tempfile::tempfile().expect("tempfile");
        write_sized(&mut file, SizedValue::truncate_from(Width::W8, 0xAA)).expect("write");
        seek_to(&mut file, 0).expect("seek");
        assert!(read_sized(&mut file, Width::W64).is_err());
    }
}
