//! Command resolution and invocation.
//!
//! Resolution tries the first user argument against the registry (direct
//! mode), then the basename of the invoking path (alias mode, for symlinks
//! named after commands), then hands unresolved invocations to the fallback
//! meta-subcommands. Direct mode always wins when both would match.

use crate::fallback;
use crate::registry::{CommandDescriptor, PrereqSpec, Registry};
use crate::services::privilege;

const EXIT_FAILURE: i32 = 1;

/// Resolve and run one command, returning the process exit status.
pub fn run(registry: &Registry, args: &[String]) -> i32 {
    if args.len() > 1 {
        if let Some(cmd) = registry.lookup(&args[1]) {
            log::debug!("resolved '{}' in direct mode", cmd.name);
            return invoke(cmd, &args[1..]);
        }
    }

    // The binary may have been started through a symlink named after a
    // command; the leading path is irrelevant to resolution.
    let alias = args.first().map(|arg0| basename(arg0)).unwrap_or("");
    if let Some(cmd) = registry.lookup(alias) {
        log::debug!("resolved '{}' in alias mode", cmd.name);
        return invoke(cmd, args);
    }

    fallback::run(registry, args)
}

fn invoke(cmd: &CommandDescriptor, argv: &[String]) -> i32 {
    if !prereqs_satisfied(argv, cmd.prereqs.as_ref()) {
        return EXIT_FAILURE;
    }

    let status = (cmd.entry)(argv, cmd);
    if status < 0 {
        EXIT_FAILURE
    } else {
        status
    }
}

/// Arity and privilege checks, run against the argv the entry will receive.
/// Never invokes the entry; its only outputs are diagnostics and the
/// privilege-elevation attempt.
fn prereqs_satisfied(argv: &[String], prereqs: Option<&PrereqSpec>) -> bool {
    let Some(spec) = prereqs else {
        return true;
    };

    if argv.len() < spec.min_args || argv.len() > spec.max_args {
        eprintln!("usage: {} {}", argv[0], spec.usage);
        return false;
    }

    if spec.required_privilege != 0 {
        if let Err(err) = privilege::raise_io_privilege(spec.required_privilege) {
            eprintln!("can't set io privilege level: {err}");
            return false;
        }
    }

    true
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CommandConfig, CommandGroup};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    static DIRECT_ARGV: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn record_direct(argv: &[String], _info: &CommandDescriptor) -> i32 {
        *DIRECT_ARGV.lock().unwrap() = argv.to_vec();
        0
    }

    #[test]
    fn direct_mode_shifts_argv_to_the_command_name() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "PCI",
            None,
            vec![CommandDescriptor::with_prereqs(
                "pci_read8",
                record_direct,
                CommandConfig::None,
                PrereqSpec::exact(5, "<bus> <dev> <func> <reg>"),
            )],
        ));

        let status = run(
            &registry,
            &args(&["/bin/regtool", "pci_read8", "0", "0", "0", "0x10"]),
        );
        assert_eq!(status, 0);
        let argv = DIRECT_ARGV.lock().unwrap().clone();
        assert_eq!(argv.len(), 5);
        assert_eq!(argv[0], "pci_read8");
        assert_eq!(argv[4], "0x10");
    }

    static ALIAS_ARGV: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn record_alias(argv: &[String], _info: &CommandDescriptor) -> i32 {
        *ALIAS_ARGV.lock().unwrap() = argv.to_vec();
        0
    }

    #[test]
    fn alias_mode_keeps_argv_untouched() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "PCI",
            None,
            vec![CommandDescriptor::with_prereqs(
                "pci_read8",
                record_alias,
                CommandConfig::None,
                PrereqSpec::exact(5, "<bus> <dev> <func> <reg>"),
            )],
        ));

        let status = run(
            &registry,
            &args(&["/usr/bin/pci_read8", "0", "0", "0", "0x10"]),
        );
        assert_eq!(status, 0);
        let argv = ALIAS_ARGV.lock().unwrap().clone();
        assert_eq!(argv.len(), 5);
        assert_eq!(argv[0], "/usr/bin/pci_read8");
    }

    static ARITY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count_calls(_argv: &[String], _info: &CommandDescriptor) -> i32 {
        ARITY_CALLS.fetch_add(1, Ordering::SeqCst);
        0
    }

    #[test]
    fn arity_violations_never_reach_the_entry() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "LOGIC",
            None,
            vec![CommandDescriptor::with_prereqs(
                "shl",
                count_calls,
                CommandConfig::None,
                PrereqSpec::exact(3, "<value> <shift>"),
            )],
        ));

        assert_eq!(run(&registry, &args(&["/bin/regtool", "shl", "1"])), 1);
        assert_eq!(
            run(&registry, &args(&["/bin/regtool", "shl", "1", "2", "3"])),
            1
        );
        assert_eq!(ARITY_CALLS.load(Ordering::SeqCst), 0);

        assert_eq!(run(&registry, &args(&["/bin/regtool", "shl", "1", "3"])), 0);
        assert_eq!(ARITY_CALLS.load(Ordering::SeqCst), 1);
    }

    fn negative(_argv: &[String], _info: &CommandDescriptor) -> i32 {
        -1
    }

    fn predicate_true(_argv: &[String], _info: &CommandDescriptor) -> i32 {
        1
    }

    #[test]
    fn entry_status_maps_to_exit_status() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "STUB",
            None,
            vec![
                CommandDescriptor::new("fails", negative, CommandConfig::None),
                CommandDescriptor::new("holds", predicate_true, CommandConfig::None),
            ],
        ));

        // Negative results collapse to the failure status; non-negative
        // results pass through so predicates stay scriptable.
        assert_eq!(run(&registry, &args(&["/bin/regtool", "fails"])), 1);
        assert_eq!(run(&registry, &args(&["/bin/regtool", "holds"])), 1);
    }

    fn by_name(argv: &[String], _info: &CommandDescriptor) -> i32 {
        // Distinguishes direct from alias mode by what argv[0] looks like.
        if argv[0].contains('/') {
            7
        } else {
            3
        }
    }

    #[test]
    fn direct_mode_outranks_alias_mode() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "STUB",
            None,
            vec![CommandDescriptor::new("not", by_name, CommandConfig::None)],
        ));

        // Invoked through a symlink named "not" with a first argument that
        // is itself a command name: direct mode must win.
        assert_eq!(run(&registry, &args(&["/usr/bin/not", "not"])), 3);
        // No direct match, so the alias resolves.
        assert_eq!(run(&registry, &args(&["/usr/bin/not", "0"])), 7);
    }

    #[test]
    fn basename_strips_the_leading_path() {
        assert_eq!(basename("/usr/bin/pci_read8"), "pci_read8");
        assert_eq!(basename("pci_read8"), "pci_read8");
        assert_eq!(basename("a/b/c"), "c");
    }
}
