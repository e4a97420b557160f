//! Meta subcommands for invocations that resolve to no registered command:
//! listing, symlink housekeeping, help, and version.

use crate::registry::Registry;
use crate::services::links;

const PROGRAM: &str = env!("CARGO_PKG_NAME");

pub fn run(registry: &Registry, args: &[String]) -> i32 {
    let argv0 = args.first().map(String::as_str).unwrap_or(PROGRAM);

    if args.len() != 2 {
        usage(argv0);
        return 1;
    }

    match args[1].as_str() {
        "--list-cmds" => {
            list_commands(registry);
            0
        }
        "--make-links" => status_of(links::make_command_links(registry)),
        "--clean-links" => status_of(links::clean_command_links(registry)),
        "--help" | "-h" => {
            println!("usage: {argv0} COMMAND");
            print_meta_commands();
            0
        }
        "--version" | "-v" => {
            println!("{} {}", PROGRAM, env!("CARGO_PKG_VERSION"));
            0
        }
        other => {
            eprintln!("'{other}' sub-command not supported by {PROGRAM}");
            usage(argv0);
            1
        }
    }
}

fn status_of(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err:#}");
            1
        }
    }
}

fn usage(argv0: &str) {
    eprintln!("usage: {argv0} COMMAND");
    eprintln!("  COMMANDS:");
    eprintln!("    --make-links");
    eprintln!("    --clean-links");
    eprintln!("    --list-cmds");
    eprintln!("    --help");
    eprintln!("    --version");
}

fn print_meta_commands() {
    println!("  COMMANDS:");
    println!("    --make-links   create one symlink per command next to the binary");
    println!("    --clean-links  remove those symlinks");
    println!("    --list-cmds    list every registered command");
    println!("    --help         this text");
    println!("    --version      print the version");
}

fn list_commands(registry: &Registry) {
    for group in registry.groups() {
        match group.description {
            Some(description) => println!("{}: {}", group.name, description),
            None => println!("{}", group.name),
        }
        for cmd in &group.commands {
            println!("  {}", cmd.name);
        }
    }
}
