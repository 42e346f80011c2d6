//! Command and option type definitions.
//!
//! This module defines the data model shared by the registry, the resolver,
//! the help formatter and the dispatcher. Option specs are plain serializable
//! values; commands additionally carry an opaque [`Invocable`] action and are
//! only ever handed out by reference once registered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::ProgramId;

/// Value type of an option.
///
/// Determines whether the flag consumes a following value when parsed.
///
/// # Examples
///
/// ```
/// use command_router_core::OptionType;
///
/// assert_eq!(OptionType::default(), OptionType::Boolean);
/// assert!(!OptionType::Boolean.takes_value());
/// assert!(OptionType::Number.takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Switch without a value (the default).
    #[default]
    Boolean,
    /// Free-form string value.
    String,
    /// Numeric value, parsed as `f64`.
    Number,
}

impl OptionType {
    /// Returns `true` if the flag consumes a value.
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

/// Declared shape of one flag a command accepts.
///
/// Names and aliases are stored without leading hyphens: the option
/// `{ name: "test", aliases: ["t"] }` is written `--test` or `-t` on the
/// command line.
///
/// # Examples
///
/// ```
/// use command_router_core::{OptionSpec, OptionType};
///
/// let spec = OptionSpec::boolean("test")
///     .with_alias("t")
///     .with_description("testing");
///
/// assert_eq!(spec.option_type, OptionType::Boolean);
/// assert!(spec.matches("test"));
/// assert!(spec.matches("t"));
/// assert!(!spec.matches("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Canonical long name (e.g. "output")
    pub name: String,
    /// Short or alternate names (e.g. "o")
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Value type
    #[serde(rename = "type", default)]
    pub option_type: OptionType,
    /// Description shown in help output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionSpec {
    /// Creates an option of the given type with no aliases.
    pub fn new(name: &str, option_type: OptionType) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            option_type,
            description: None,
        }
    }

    /// Creates a boolean switch.
    pub fn boolean(name: &str) -> Self {
        Self::new(name, OptionType::Boolean)
    }

    /// Creates an option taking a string value.
    pub fn string(name: &str) -> Self {
        Self::new(name, OptionType::String)
    }

    /// Creates an option taking a numeric value.
    pub fn number(name: &str) -> Self {
        Self::new(name, OptionType::Number)
    }

    /// Appends an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Checks whether a bare flag name (no hyphens) refers to this option.
    pub fn matches(&self, flag: &str) -> bool {
        self.name == flag || self.aliases.iter().any(|a| a == flag)
    }
}

/// Error type returned by actions.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque callback attached to a command.
///
/// The router never inspects an action; it only calls [`run`](Invocable::run)
/// with the parsed [`Invocation`]. Any `Fn(&Invocation) -> Result<(), ActionError>`
/// closure is an `Invocable`, see [`action`].
pub trait Invocable: Send + Sync {
    /// Runs the action.
    fn run(&self, invocation: &Invocation) -> Result<(), ActionError>;
}

impl<F> Invocable for F
where
    F: Fn(&Invocation) -> Result<(), ActionError> + Send + Sync,
{
    fn run(&self, invocation: &Invocation) -> Result<(), ActionError> {
        self(invocation)
    }
}

/// Wraps a closure into a shareable action.
///
/// # Examples
///
/// ```
/// use command_router_core::{Invocable, Invocation, action};
///
/// let hello = action(|inv: &Invocation| {
///     assert_eq!(inv.path, vec!["hello"]);
///     Ok(())
/// });
/// let inv = Invocation::new(vec!["hello".into()]);
/// assert!(hello.run(&inv).is_ok());
/// ```
pub fn action<F>(f: F) -> Arc<dyn Invocable>
where
    F: Fn(&Invocation) -> Result<(), ActionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Action that does nothing.
///
/// Used for commands declared in manifests, where the caller only wants
/// resolution and parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

impl Invocable for NoopAction {
    fn run(&self, _invocation: &Invocation) -> Result<(), ActionError> {
        Ok(())
    }
}

/// A leaf invocable unit.
///
/// Commands are created by [`Registry::command`](crate::Registry::command)
/// and never mutated afterwards. [`Command::new`] builds a detached command
/// (no owning program), which is what the resolver tests and callers holding
/// their own command lists use.
#[derive(Clone)]
pub struct Command {
    /// Leaf name
    pub name: String,
    /// Program names below the root, followed by `name`
    pub path: Vec<String>,
    /// Options in declaration order
    pub options: Vec<OptionSpec>,
    /// Program the command was registered on
    pub program: Option<ProgramId>,
    action: Arc<dyn Invocable>,
}

impl Command {
    /// Creates a detached command.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_router_core::{Command, NoopAction, OptionSpec};
    /// use std::sync::Arc;
    ///
    /// let cmd = Command::new(
    ///     "test",
    ///     vec!["test1".into(), "test".into()],
    ///     vec![OptionSpec::boolean("test").with_alias("t")],
    ///     Arc::new(NoopAction),
    /// );
    /// assert_eq!(cmd.depth(), 2);
    /// assert!(cmd.find_option("t").is_some());
    /// ```
    pub fn new(
        name: &str,
        path: Vec<String>,
        options: Vec<OptionSpec>,
        action: Arc<dyn Invocable>,
    ) -> Self {
        Self {
            name: name.to_string(),
            path,
            options,
            program: None,
            action,
        }
    }

    pub(crate) fn registered(
        name: &str,
        path: Vec<String>,
        options: Vec<OptionSpec>,
        action: Arc<dyn Invocable>,
        program: ProgramId,
    ) -> Self {
        Self {
            program: Some(program),
            ..Self::new(name, path, options, action)
        }
    }

    /// Number of path segments.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Finds a declared option by bare name or alias.
    pub fn find_option(&self, flag: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.matches(flag))
    }

    /// Runs the attached action.
    pub fn invoke(&self, invocation: &Invocation) -> Result<(), ActionError> {
        self.action.run(invocation)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("options", &self.options)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

/// Parsed value of one option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
}

/// Parsed arguments handed to an action.
///
/// Options are keyed by their canonical name, whichever alias was used on the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Invocation {
    /// Path of the resolved command
    pub path: Vec<String>,
    /// Options that were given
    pub options: BTreeMap<String, OptionValue>,
    /// Positional arguments in order
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an empty invocation for a command path.
    pub fn new(path: Vec<String>) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Returns `true` if a boolean option was set to `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.options.get(name), Some(OptionValue::Bool(true)))
    }

    /// Returns the value of a string option.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of a numeric option.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.options.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}
