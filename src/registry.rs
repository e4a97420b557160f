//! Command registry: groups of named subcommands plus the metadata the
//! dispatcher needs to validate and invoke them.
//!
//! Groups are registered once at startup and never mutated afterwards. The
//! registry is searched newest-registration-first, so a later group's command
//! shadows an earlier one of the same name.

use crate::commands::logic::LogicOp;
use crate::services::smbus::SmbusSize;
use crate::value::Width;

/// Entry point of a subcommand. Receives the argument vector (element 0 is
/// the command name in direct mode, the invoking path in alias mode) and its
/// own descriptor. A negative return denotes failure; non-negative returns
/// become the process exit status verbatim, which the logic commands use to
/// expose a boolean predicate to shell scripts.
pub type EntryFn = fn(&[String], &CommandDescriptor) -> i32;

/// Per-command typed configuration, read back by the entry through its
/// descriptor. The closed set replaces per-backend untyped pointers.
#[derive(Clone, Copy, Debug)]
pub enum CommandConfig {
    None,
    Width(Width),
    Logic(LogicOp),
    Smbus(SmbusSize),
}

impl CommandConfig {
    pub fn width(&self) -> Option<Width> {
        match *self {
            CommandConfig::Width(width) => Some(width),
            _ => None,
        }
    }

    pub fn logic(&self) -> Option<LogicOp> {
        match *self {
            CommandConfig::Logic(op) => Some(op),
            _ => None,
        }
    }

    pub fn smbus(&self) -> Option<SmbusSize> {
        match *self {
            CommandConfig::Smbus(size) => Some(size),
            _ => None,
        }
    }
}

/// Argument-count window and privilege requirement checked before an entry
/// runs. `min_args`/`max_args` count element 0 of the argument vector, so a
/// command taking two user parameters has `min_args == max_args == 3`.
#[derive(Clone, Copy, Debug)]
pub struct PrereqSpec {
    pub min_args: usize,
    pub max_args: usize,
    pub usage: &'static str,
    /// I/O privilege level to raise to before running; 0 requests nothing.
    pub required_privilege: i32,
}

impl PrereqSpec {
    pub const fn exact(args: usize, usage: &'static str) -> Self {
        Self::range(args, args, usage)
    }

    pub const fn range(min_args: usize, max_args: usize, usage: &'static str) -> Self {
        PrereqSpec {
            min_args,
            max_args,
            usage,
            required_privilege: 0,
        }
    }

    pub const fn privileged(args: usize, usage: &'static str, level: i32) -> Self {
        PrereqSpec {
            min_args: args,
            max_args: args,
            usage,
            required_privilege: level,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub entry: EntryFn,
    pub config: CommandConfig,
    pub prereqs: Option<PrereqSpec>,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, entry: EntryFn, config: CommandConfig) -> Self {
        CommandDescriptor {
            name,
            entry,
            config,
            prereqs: None,
        }
    }

    pub fn with_prereqs(
        name: &'static str,
        entry: EntryFn,
        config: CommandConfig,
        prereqs: PrereqSpec,
    ) -> Self {
        CommandDescriptor {
            name,
            entry,
            config,
            prereqs: Some(prereqs),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CommandGroup {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub commands: Vec<CommandDescriptor>,
}

impl CommandGroup {
    pub fn new(
        name: &'static str,
        description: Option<&'static str>,
        commands: Vec<CommandDescriptor>,
    ) -> Self {
        CommandGroup {
            name,
            description,
            commands,
        }
    }
}

/// Ordered collection of command groups, traversed newest-first.
#[derive(Default)]
pub struct Registry {
    groups: Vec<CommandGroup>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Insert `group` at the head of the traversal order. Duplicate command
    /// names are not rejected; the newest registration wins on lookup.
    pub fn register(&mut self, group: CommandGroup) {
        self.groups.insert(0, group);
    }

    /// Exact, case-sensitive match over groups in traversal order, commands
    /// in their declared order.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.groups
            .iter()
            .flat_map(|group| group.commands.iter())
            .find(|cmd| cmd.name == name)
    }

    /// Groups in traversal order, for listing and link housekeeping.
    pub fn groups(&self) -> impl Iterator<Item = &CommandGroup> {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten(_argv: &[String], _info: &CommandDescriptor) -> i32 {
        10
    }

    fn twenty(_argv: &[String], _info: &CommandDescriptor) -> i32 {
        20
    }

    fn group_with(name: &'static str, cmd: &'static str, entry: EntryFn) -> CommandGroup {
        CommandGroup::new(
            name,
            None,
            vec![CommandDescriptor::new(cmd, entry, CommandConfig::None)],
        )
    }

    #[test]
    fn lookup_is_deterministic() {
        let mut registry = Registry::new();
        registry.register(group_with("A", "x", ten));
        let first = registry.lookup("x").expect("x registered");
        let second = registry.lookup("x").expect("x registered");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn later_group_shadows_earlier_one() {
        let mut registry = Registry::new();
        registry.register(group_with("A", "x", ten));
        registry.register(group_with("B", "x", twenty));
        let cmd = registry.lookup("x").expect("x registered twice");
        let argv = vec!["x".to_string()];
        assert_eq!((cmd.entry)(&argv, cmd), 20);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let mut registry = Registry::new();
        registry.register(group_with("A", "read8", ten));
        assert!(registry.lookup("read8").is_some());
        assert!(registry.lookup("read").is_none());
        assert!(registry.lookup("READ8").is_none());
        assert!(registry.lookup("read80").is_none());
    }

    #[test]
    fn enumeration_walks_every_group_and_command() {
        let mut registry = Registry::new();
        registry.register(CommandGroup::new(
            "FIRST",
            Some("registered first"),
            vec![
                CommandDescriptor::new("a", ten, CommandConfig::None),
                CommandDescriptor::new("b", ten, CommandConfig::None),
            ],
        ));
        registry.register(group_with("SECOND", "c", ten));

        let listed: Vec<(&str, Vec<&str>)> = registry
            .groups()
            .map(|g| (g.name, g.commands.iter().map(|c| c.name).collect()))
            .collect();
        assert_eq!(
            listed,
            vec![("SECOND", vec!["c"]), ("FIRST", vec!["a", "b"])]
        );
    }
}
