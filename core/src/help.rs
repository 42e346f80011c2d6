//! Usage text rendering.
//!
//! The output is whitespace-significant and compared byte for byte by
//! callers, so the layout below is fixed:
//!
//! ```text
//! Usage: test [args]
//!     --test, -t     testing
//! ```
//!
//! Every option line is four spaces, the flag list, a five-space gap, the
//! description (possibly empty) and one trailing space.

use std::fmt::Write;

use crate::{Command, OptionSpec, ProgramId, Registry};

const INDENT: &str = "    ";
const GAP: &str = "     ";

fn flag_list(option: &OptionSpec) -> String {
    let mut flags = format!("--{}", option.name);
    for alias in &option.aliases {
        let _ = write!(flags, ", -{alias}");
    }
    flags
}

/// Renders the usage message of one command.
///
/// # Examples
///
/// ```
/// use command_router_core::*;
/// use std::sync::Arc;
///
/// let cmd = Command::new(
///     "test",
///     vec!["test".into()],
///     vec![OptionSpec::boolean("test").with_alias("t").with_description("testing")],
///     Arc::new(NoopAction),
/// );
/// assert_eq!(
///     help_message_for_command(&cmd),
///     "Usage: test [args]\n    --test, -t     testing \n"
/// );
/// ```
pub fn help_message_for_command(command: &Command) -> String {
    let mut out = format!("Usage: {} [args]\n", command.name);
    for option in &command.options {
        let _ = writeln!(
            out,
            "{INDENT}{}{GAP}{} ",
            flag_list(option),
            option.description.as_deref().unwrap_or("")
        );
    }
    out
}

/// Renders the usage message of a program node.
///
/// Lists the commands registered directly on the program and its child
/// programs, each block only when non-empty. Unknown ids render an empty
/// string.
pub fn help_message_for_program(registry: &Registry, program: ProgramId) -> String {
    let Some(node) = registry.get(program) else {
        return String::new();
    };
    let root = registry.find_deepest_parent(program);
    let mut usage = registry
        .get(root)
        .map(|r| r.name.clone())
        .unwrap_or_default();
    for segment in registry.path(program) {
        if !usage.is_empty() {
            usage.push(' ');
        }
        usage.push_str(&segment);
    }

    let mut out = format!("Usage: {usage} <command> [args]\n");
    let commands: Vec<&Command> = registry.commands_of(program).collect();
    if !commands.is_empty() {
        out.push_str("Commands:\n");
        for command in commands {
            let _ = writeln!(out, "{INDENT}{}", command.name);
        }
    }
    if !node.children.is_empty() {
        out.push_str("Programs:\n");
        for (_, child) in registry.children(program) {
            let _ = writeln!(out, "{INDENT}{}", child.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::NoopAction;

    #[test]
    fn test_outputs_help_message_for_a_command() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let cmd = registry
            .command(
                root,
                "test",
                vec![
                    OptionSpec::boolean("test")
                        .with_alias("t")
                        .with_description("testing"),
                ],
                Arc::new(NoopAction),
            )
            .unwrap();

        assert_eq!(
            help_message_for_command(cmd),
            "Usage: test [args]\n    --test, -t     testing \n"
        );
    }

    #[test]
    fn test_outputs_help_message_for_a_command_with_no_options() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let cmd = registry
            .command(root, "test", Vec::new(), Arc::new(NoopAction))
            .unwrap();

        assert_eq!(help_message_for_command(cmd), "Usage: test [args]\n");
    }

    #[test]
    fn test_outputs_help_message_for_a_command_with_no_description() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let cmd = registry
            .command(
                root,
                "test",
                vec![OptionSpec::boolean("test").with_alias("t")],
                Arc::new(NoopAction),
            )
            .unwrap();

        assert_eq!(
            help_message_for_command(cmd),
            "Usage: test [args]\n    --test, -t      \n"
        );
    }

    #[test]
    fn test_help_lists_options_in_declaration_order() {
        let cmd = Command::new(
            "serve",
            vec!["serve".into()],
            vec![
                OptionSpec::number("port").with_alias("p").with_alias("P"),
                OptionSpec::boolean("open"),
            ],
            Arc::new(NoopAction),
        );

        assert_eq!(
            help_message_for_command(&cmd),
            "Usage: serve [args]\n    --port, -p, -P      \n    --open      \n"
        );
    }

    #[test]
    fn test_program_help_lists_commands_and_programs() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let tools = registry.program(root, "tools").unwrap();
        registry
            .command(root, "init", Vec::new(), Arc::new(NoopAction))
            .unwrap();
        registry
            .command(tools, "build", Vec::new(), Arc::new(NoopAction))
            .unwrap();

        assert_eq!(
            help_message_for_program(&registry, root),
            "Usage: cli <command> [args]\nCommands:\n    init\nPrograms:\n    tools\n"
        );
        assert_eq!(
            help_message_for_program(&registry, tools),
            "Usage: cli tools <command> [args]\nCommands:\n    build\n"
        );
    }
}
