//! Matching, option parsing and action invocation.
//!
//! The [`Dispatcher`] ties the other pieces together for one invocation:
//!
//! 1. Candidate commands are those whose leaf name equals the first token
//!    (`build ...`) and those whose full path prefixes the tokens
//!    (`tools build ...`). The matched prefix is the full path when it
//!    matches, otherwise the leaf name alone. Tokens after `--` never take
//!    part in selection.
//! 2. [`find_exact_command`] picks one candidate.
//! 3. The remaining tokens are parsed against the command's options.
//! 4. The action runs, unless help was requested.

use std::iter::Peekable;

use thiserror::Error;
use tracing::debug;

use crate::classify::{END_OF_OPTIONS, flag_name, is_option, split_value};
use crate::help::{help_message_for_command, help_message_for_program};
use crate::resolve::find_exact_command;
use crate::{ActionError, Command, Invocation, OptionType, OptionValue, Registry};

const HELP_FLAGS: [&str; 2] = ["help", "h"];

/// Errors surfaced to the caller of [`Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No tokens were given.
    #[error("no command given")]
    MissingCommand,
    /// No registered command matches the leading token.
    #[error("command not found: {0}")]
    CommandNotFound(String),
    /// A flag is not declared by the resolved command.
    #[error("unknown option '{option}' for command '{command}'")]
    UnknownOption { command: String, option: String },
    /// A string or number option was given without a value.
    #[error("option '--{0}' requires a value")]
    MissingValue(String),
    /// A number option got a value that does not parse.
    #[error("option '--{option}' expects a number, got '{value}'")]
    InvalidNumber { option: String, value: String },
    /// A boolean option got an inline value other than `true`/`false`.
    #[error("option '--{option}' expects true or false, got '{value}'")]
    InvalidBoolean { option: String, value: String },
    /// The command's action returned an error.
    #[error("command '{command}' failed: {source}")]
    Action {
        command: String,
        #[source]
        source: ActionError,
    },
}

/// A resolved command and the tokens left after its name.
#[derive(Debug, Clone)]
pub struct Resolution<'r> {
    /// The selected command
    pub command: &'r Command,
    /// Tokens after the matched command-name prefix
    pub args: Vec<String>,
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The action ran with this invocation.
    Ran(Invocation),
    /// Help was requested; the text is for the caller to print.
    Help(String),
}

/// Routes invocations against a finished [`Registry`].
///
/// # Examples
///
/// ```
/// use command_router_core::*;
/// use std::sync::Arc;
///
/// let mut registry = Registry::new("cli");
/// let root = registry.root();
/// registry
///     .command(root, "serve", vec![OptionSpec::number("port").with_alias("p")], Arc::new(NoopAction))
///     .unwrap();
///
/// let dispatcher = Dispatcher::new(&registry);
/// match dispatcher.dispatch(&["serve", "-p", "8080", "site"]).unwrap() {
///     Outcome::Ran(inv) => {
///         assert_eq!(inv.number("port"), Some(8080.0));
///         assert_eq!(inv.args, vec!["site"]);
///     }
///     Outcome::Help(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher over `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry being dispatched against.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Selects the command addressed by `tokens`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MissingCommand`] for empty tokens,
    /// [`DispatchError::CommandNotFound`] when nothing matches.
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Resolution<'r>, DispatchError> {
        let Some(first) = tokens.first().map(|t| t.as_ref()) else {
            return Err(DispatchError::MissingCommand);
        };

        // Tokens after `--` are positional and take no part in selection.
        let end = tokens
            .iter()
            .position(|t| t.as_ref() == END_OF_OPTIONS)
            .unwrap_or(tokens.len());
        let head = &tokens[..end];

        let candidates: Vec<&'r Command> = self
            .registry
            .commands()
            .filter(|c| c.name == first || path_prefixes(&c.path, head))
            .collect();
        debug!(token = first, candidates = candidates.len(), "Matched command candidates");

        let command = find_exact_command(candidates, head)
            .ok_or_else(|| DispatchError::CommandNotFound(first.to_string()))?;
        let consumed = if path_prefixes(&command.path, head) {
            command.depth()
        } else {
            1
        };
        let args = tokens[consumed..]
            .iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        Ok(Resolution { command, args })
    }

    /// Parses `args` against the options declared by `command`.
    ///
    /// Flags are matched by name or alias and stored under the canonical
    /// name; a repeated flag keeps its last value. Everything after `--` is
    /// positional.
    pub fn parse_options<S: AsRef<str>>(
        &self,
        command: &Command,
        args: &[S],
    ) -> Result<Invocation, DispatchError> {
        let mut invocation = Invocation::new(command.path.clone());
        let mut rest = args.iter().map(|t| t.as_ref()).peekable();

        while let Some(token) = rest.next() {
            if token == END_OF_OPTIONS {
                invocation.args.extend(rest.by_ref().map(String::from));
                break;
            }
            let Some((flag, inline)) = split_value(token) else {
                invocation.args.push(token.to_string());
                continue;
            };
            let spec = command
                .find_option(flag)
                .ok_or_else(|| DispatchError::UnknownOption {
                    command: command.path.join(" "),
                    option: token.to_string(),
                })?;

            let value = match spec.option_type {
                OptionType::Boolean => match inline {
                    None | Some("true") => OptionValue::Bool(true),
                    Some("false") => OptionValue::Bool(false),
                    Some(other) => {
                        return Err(DispatchError::InvalidBoolean {
                            option: spec.name.clone(),
                            value: other.to_string(),
                        });
                    }
                },
                OptionType::String => {
                    OptionValue::String(take_value(&spec.name, inline, &mut rest, false)?)
                }
                OptionType::Number => {
                    let raw = take_value(&spec.name, inline, &mut rest, true)?;
                    let number = raw.parse::<f64>().map_err(|_| DispatchError::InvalidNumber {
                        option: spec.name.clone(),
                        value: raw.clone(),
                    })?;
                    OptionValue::Number(number)
                }
            };
            invocation.options.insert(spec.name.clone(), value);
        }

        Ok(invocation)
    }

    /// Resolves, parses and runs one invocation.
    ///
    /// Returns [`Outcome::Help`] instead of running anything when the tokens
    /// are empty, when they address a program rather than a command, or when
    /// `--help`/`-h` is given to a command that does not declare such an
    /// option itself.
    pub fn dispatch<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Outcome, DispatchError> {
        if tokens.is_empty() {
            return Ok(Outcome::Help(help_message_for_program(
                self.registry,
                self.registry.root(),
            )));
        }

        let resolution = match self.resolve(tokens) {
            Ok(resolution) => resolution,
            Err(err) => return self.program_help(tokens).ok_or(err),
        };
        let command = resolution.command;

        if wants_help(command, &resolution.args) {
            debug!(command = ?command.path, "Help requested");
            return Ok(Outcome::Help(help_message_for_command(command)));
        }

        let invocation = self.parse_options(command, &resolution.args)?;
        debug!(command = ?command.path, options = invocation.options.len(), args = invocation.args.len(), "Invoking command");
        command
            .invoke(&invocation)
            .map_err(|source| DispatchError::Action {
                command: command.path.join(" "),
                source,
            })?;

        Ok(Outcome::Ran(invocation))
    }

    /// Help for the deepest program named by the leading tokens, if the
    /// remaining tokens are empty or a help flag.
    fn program_help<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Outcome> {
        let positional = tokens
            .iter()
            .map(|t| t.as_ref())
            .take_while(|t| !is_option(t))
            .count();
        (0..=positional).rev().find_map(|len| {
            let program = self.registry.find_program(&tokens[..len])?;
            let rest = &tokens[len..];
            let only_help = rest
                .iter()
                .all(|t| flag_name(t.as_ref()).is_some_and(|f| HELP_FLAGS.contains(&f)));
            only_help.then(|| Outcome::Help(help_message_for_program(self.registry, program)))
        })
    }
}

fn path_prefixes<S: AsRef<str>>(path: &[String], tokens: &[S]) -> bool {
    path.len() <= tokens.len() && path.iter().zip(tokens).all(|(p, t)| p == t.as_ref())
}

fn wants_help<S: AsRef<str>>(command: &Command, args: &[S]) -> bool {
    args.iter()
        .map(|t| t.as_ref())
        .take_while(|t| *t != END_OF_OPTIONS)
        .filter_map(flag_name)
        .any(|f| HELP_FLAGS.contains(&f) && command.find_option(f).is_none())
}

/// Value of a string or number option: inline, or the next token.
///
/// The next token is refused when it looks like an option, except that a
/// number option accepts a negative literal such as `-5`.
fn take_value<'t, I>(
    option: &str,
    inline: Option<&str>,
    rest: &mut Peekable<I>,
    numeric: bool,
) -> Result<String, DispatchError>
where
    I: Iterator<Item = &'t str>,
{
    if let Some(value) = inline {
        return Ok(value.to_string());
    }
    rest.next_if(|t| {
        *t != END_OF_OPTIONS && (!is_option(t) || (numeric && t.parse::<f64>().is_ok()))
    })
        .map(String::from)
        .ok_or_else(|| DispatchError::MissingValue(option.to_string()))
}
