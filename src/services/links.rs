//! Symlink housekeeping: one link per registered command, next to the
//! binary, each pointing at the bare binary name. Links are what make alias
//! mode reachable from a shell.

use crate::registry::Registry;
use anyhow::Context;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

fn binary_location() -> anyhow::Result<(PathBuf, String)> {
    let exe = std::env::current_exe().context("unable to locate the running binary")?;
    let dir = exe
        .parent()
        .context("running binary has no parent directory")?
        .to_path_buf();
    let name = exe
        .file_name()
        .context("running binary has no file name")?
        .to_string_lossy()
        .into_owned();
    Ok((dir, name))
}

fn link_path(dir: &Path, command: &str) -> PathBuf {
    dir.join(command)
}

pub fn make_command_links(registry: &Registry) -> anyhow::Result<()> {
    let (dir, bin_name) = binary_location()?;

    for group in registry.groups() {
        for cmd in &group.commands {
            let link = link_path(&dir, cmd.name);
            println!("Creating link: {} -> {}", link.display(), bin_name);
            if let Err(err) = symlink(&bin_name, &link) {
                eprintln!(
                    "Unable to create link: {} -> {}: {}",
                    link.display(),
                    bin_name,
                    err
                );
            }
        }
    }

    Ok(())
}

pub fn clean_command_links(registry: &Registry) -> anyhow::Result<()> {
    let (dir, _) = binary_location()?;

    for group in registry.groups() {
        for cmd in &group.commands {
            let link = link_path(&dir, cmd.name);
            match std::fs::remove_file(&link) {
                Ok(()) => log::debug!("removed link {}", link.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    eprintln!("Unable to remove link: {}: {}", link.display(), err);
                }
            }
        }
    }

    Ok(())
}
