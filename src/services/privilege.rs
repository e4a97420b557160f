//! I/O privilege level elevation for port-access commands.

use std::io;

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub fn raise_io_privilege(level: i32) -> io::Result<()> {
    log::debug!("raising io privilege level to {level}");
    if unsafe { libc::iopl(level) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
pub fn raise_io_privilege(_level: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "io privilege levels are not supported on this platform",
    ))
}
