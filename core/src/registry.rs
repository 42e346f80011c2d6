//! Program tree and command registry.
//!
//! Programs live in an arena addressed by [`ProgramId`]. Each node owns the
//! list of its children and commands and keeps a non-owning index of its
//! parent, so walking up to the root needs no reference counting and cannot
//! form a cycle: a program gets its parent once, when it is created, and is
//! never re-parented.
//!
//! Command paths leave out the root program's name. A command `build`
//! registered on the root has path `["build"]`; registered on the child
//! program `tools` it has path `["tools", "build"]`.
//!
//! # Examples
//!
//! ```
//! use command_router_core::*;
//! use std::sync::Arc;
//!
//! let mut registry = Registry::new("cli");
//! let root = registry.root();
//! let tools = registry.program(root, "tools").unwrap();
//! registry
//!     .command(tools, "build", vec![OptionSpec::boolean("release")], Arc::new(NoopAction))
//!     .unwrap();
//!
//! let build = registry.commands().next().unwrap();
//! assert_eq!(build.path, vec!["tools", "build"]);
//! assert_eq!(registry.find_deepest_parent(tools), root);
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::validate::{ValidationError, validate_command, validate_program};
use crate::{Command, Invocable, OptionSpec};

/// Index of a program node inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(usize);

impl ProgramId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The command or program failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The program id does not belong to this registry.
    #[error("unknown program id: {0}")]
    UnknownProgram(usize),
}

/// A program node: a container for commands and nested programs.
#[derive(Debug, Clone)]
pub struct Program {
    /// Program name
    pub name: String,
    /// Parent node, `None` for the root
    pub parent: Option<ProgramId>,
    /// Child programs in creation order
    pub children: Vec<ProgramId>,
    /// Indices into the registry's command list
    commands: Vec<usize>,
}

/// Arena holding the whole program tree and every registered command.
#[derive(Debug, Clone)]
pub struct Registry {
    programs: Vec<Program>,
    commands: Vec<Command>,
}

impl Registry {
    /// Creates a registry holding a single root program.
    pub fn new(root_name: &str) -> Self {
        Self {
            programs: vec![Program {
                name: root_name.to_string(),
                parent: None,
                children: Vec::new(),
                commands: Vec::new(),
            }],
            commands: Vec::new(),
        }
    }

    /// Returns the root program.
    pub fn root(&self) -> ProgramId {
        ProgramId(0)
    }

    /// Looks up a program node.
    pub fn get(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(id.0)
    }

    fn node(&self, id: ProgramId) -> Result<&Program, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownProgram(id.0))
    }

    /// Creates a child program under `parent` and returns it.
    ///
    /// Names are unique among siblings: if `parent` already has a child
    /// called `name`, that child is returned and nothing is created.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProgram`] if `parent` is not part of
    /// this registry, or a validation error for an empty name.
    pub fn program(&mut self, parent: ProgramId, name: &str) -> Result<ProgramId, RegistryError> {
        self.node(parent)?;
        if let Some(err) = validate_program(name).into_iter().next() {
            return Err(err.into());
        }
        if let Some(existing) = self
            .children(parent)
            .find(|(_, p)| p.name == name)
            .map(|(id, _)| id)
        {
            return Ok(existing);
        }

        let id = ProgramId(self.programs.len());
        self.programs.push(Program {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            commands: Vec::new(),
        });
        self.programs[parent.0].children.push(id);
        debug!(program = name, parent = parent.0, id = id.0, "Registered program");
        Ok(id)
    }

    /// Registers a command on `program`.
    ///
    /// The command's path is derived from the program chain. Options are
    /// validated up front; a command with an empty name, a malformed option
    /// name or a name/alias declared twice is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] or
    /// [`RegistryError::UnknownProgram`].
    pub fn command(
        &mut self,
        program: ProgramId,
        name: &str,
        options: Vec<OptionSpec>,
        action: Arc<dyn Invocable>,
    ) -> Result<&Command, RegistryError> {
        self.node(program)?;
        if let Some(err) = validate_command(name, &options).into_iter().next() {
            return Err(err.into());
        }

        let mut path = self.path(program);
        path.push(name.to_string());
        debug!(command = ?path, options = options.len(), "Registered command");

        let index = self.commands.len();
        self.commands
            .push(Command::registered(name, path, options, action, program));
        self.programs[program.0].commands.push(index);
        Ok(&self.commands[index])
    }

    /// Iterates every command in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Iterates the commands registered directly on `program`.
    pub fn commands_of(&self, program: ProgramId) -> impl Iterator<Item = &Command> {
        self.get(program)
            .into_iter()
            .flat_map(|p| p.commands.iter().map(|&i| &self.commands[i]))
    }

    /// Iterates the direct children of `program`.
    pub fn children(&self, program: ProgramId) -> impl Iterator<Item = (ProgramId, &Program)> {
        self.get(program)
            .into_iter()
            .flat_map(|p| p.children.iter().map(|&id| (id, &self.programs[id.0])))
    }

    /// Program names from below the root down to `program`.
    ///
    /// The root itself has an empty path.
    pub fn path(&self, program: ProgramId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = program;
        while let Some(node) = self.get(current) {
            match node.parent {
                Some(parent) => {
                    names.push(node.name.clone());
                    current = parent;
                }
                None => break,
            }
        }
        names.reverse();
        names
    }

    /// Number of parent links between `program` and the root.
    pub fn depth(&self, program: ProgramId) -> usize {
        self.path(program).len()
    }

    /// Walks parent links up to the root.
    ///
    /// A root returns itself, so the result is a fixed point:
    /// `find_deepest_parent(find_deepest_parent(x)) == find_deepest_parent(x)`.
    pub fn find_deepest_parent(&self, program: ProgramId) -> ProgramId {
        let mut current = program;
        while let Some(parent) = self.get(current).and_then(|p| p.parent) {
            current = parent;
        }
        current
    }

    /// Root of the program a command was registered on.
    ///
    /// Returns `None` for detached commands built with [`Command::new`].
    pub fn find_deepest_parent_of_command(&self, command: &Command) -> Option<ProgramId> {
        command.program.map(|p| self.find_deepest_parent(p))
    }

    /// Finds a program by its path below the root.
    pub fn find_program<S: AsRef<str>>(&self, path: &[S]) -> Option<ProgramId> {
        let mut current = self.root();
        for segment in path {
            let (id, _) = self
                .children(current)
                .find(|(_, p)| p.name == segment.as_ref())?;
            current = id;
        }
        Some(current)
    }

    /// Number of program nodes, root included.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopAction;

    fn noop() -> Arc<dyn Invocable> {
        Arc::new(NoopAction)
    }

    #[test]
    fn test_find_deepest_parent_of_root_is_itself() {
        let registry = Registry::new("cli");
        let root = registry.root();
        assert_eq!(registry.find_deepest_parent(root), root);
    }

    #[test]
    fn test_find_deepest_parent_of_child() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let child = registry.program(root, "child").unwrap();

        assert_eq!(registry.find_deepest_parent(child), root);
    }

    #[test]
    fn test_find_deepest_parent_of_grandchild() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let child = registry.program(root, "child").unwrap();
        let grandchild = registry.program(child, "grandchild").unwrap();

        assert_eq!(registry.find_deepest_parent(grandchild), root);
        assert_eq!(registry.depth(grandchild), 2);
    }

    #[test]
    fn test_find_deepest_parent_is_idempotent() {
        let mut registry = Registry::new("cli");
        let mut current = registry.root();
        for depth in 0..6 {
            current = registry.program(current, &format!("p{depth}")).unwrap();
            let top = registry.find_deepest_parent(current);
            assert_eq!(registry.find_deepest_parent(top), top);
            assert_eq!(top, registry.root());
        }
    }

    #[test]
    fn test_command_paths_follow_program_chain() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let test1 = registry.program(root, "test1").unwrap();
        registry.command(root, "test", Vec::new(), noop()).unwrap();
        registry.command(test1, "test", Vec::new(), noop()).unwrap();

        let paths: Vec<_> = registry.commands().map(|c| c.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["test".to_string()],
                vec!["test1".to_string(), "test".to_string()],
            ]
        );
        assert_eq!(registry.commands_of(test1).count(), 1);
    }

    #[test]
    fn test_command_remembers_its_program() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let child = registry.program(root, "child").unwrap();
        let cmd = registry.command(child, "run", Vec::new(), noop()).unwrap();

        assert_eq!(cmd.program, Some(child));
        let cmd = cmd.clone();
        assert_eq!(registry.find_deepest_parent_of_command(&cmd), Some(root));
    }

    #[test]
    fn test_command_rejects_duplicate_option() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let err = registry
            .command(
                root,
                "test",
                vec![
                    OptionSpec::boolean("test").with_alias("t"),
                    OptionSpec::boolean("t"),
                ],
                noop(),
            )
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::Validation(ValidationError::DuplicateOption("t".to_string()))
        );
        assert_eq!(registry.command_count(), 0);
    }

    #[test]
    fn test_program_rejects_unknown_parent() {
        let mut registry = Registry::new("cli");
        let other = {
            let mut other = Registry::new("other");
            let root = other.root();
            let a = other.program(root, "a").unwrap();
            other.program(a, "b").unwrap()
        };

        assert_eq!(
            registry.program(other, "x"),
            Err(RegistryError::UnknownProgram(2))
        );
    }

    #[test]
    fn test_program_reuses_existing_sibling() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let first = registry.program(root, "remote").unwrap();
        registry.command(first, "add", Vec::new(), noop()).unwrap();
        let second = registry.program(root, "remote").unwrap();
        registry.command(second, "remove", Vec::new(), noop()).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.program_count(), 2);
        assert_eq!(registry.children(root).count(), 1);
        let found = registry.find_program(&["remote"]).unwrap();
        assert_eq!(registry.commands_of(found).count(), 2);

        // Same name under a different parent is a different program.
        let nested = registry.program(first, "remote").unwrap();
        assert_ne!(nested, first);
        assert_eq!(registry.path(nested), vec!["remote", "remote"]);
    }

    #[test]
    fn test_find_program_by_path() {
        let mut registry = Registry::new("cli");
        let root = registry.root();
        let a = registry.program(root, "a").unwrap();
        let b = registry.program(a, "b").unwrap();

        assert_eq!(registry.find_program(&["a", "b"]), Some(b));
        assert_eq!(registry.find_program::<&str>(&[]), Some(root));
        assert_eq!(registry.find_program(&["b"]), None);
        assert_eq!(registry.path(b), vec!["a", "b"]);
    }
}
