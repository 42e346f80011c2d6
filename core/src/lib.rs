//! Command tree, resolution and help rendering for command-line routers.
//!
//! This crate turns a tree of registered commands and a list of invocation
//! tokens into exactly one command to run:
//!
//! - [`Registry`] — an arena of program nodes ([`ProgramId`]) holding
//!   [`Command`]s, each annotated with its path below the root.
//! - [`has_options`] — classifies tokens as option flags or positionals.
//! - [`find_exact_command`] — picks one command among candidates sharing a
//!   name, by matched options first and path depth second.
//! - [`help_message_for_command`] — renders a command's usage text.
//! - [`Dispatcher`] — matches the command prefix, parses options into an
//!   [`Invocation`] and runs the command's [`Invocable`] action.
//!
//! Registration validates options up front ([`validate_options`]), so a
//! command never declares the same flag twice.
//!
//! # Example
//!
//! ```
//! use command_router_core::*;
//! use std::sync::Arc;
//!
//! let mut registry = Registry::new("cli");
//! let root = registry.root();
//! let test1 = registry.program(root, "test1").unwrap();
//! registry.command(root, "test", vec![], Arc::new(NoopAction)).unwrap();
//! registry
//!     .command(
//!         test1,
//!         "test",
//!         vec![OptionSpec::boolean("test").with_alias("t")],
//!         Arc::new(NoopAction),
//!     )
//!     .unwrap();
//!
//! let found = find_exact_command(registry.commands(), &["--test"]).unwrap();
//! assert_eq!(found.path, vec!["test1", "test"]);
//! assert_eq!(
//!     help_message_for_command(found),
//!     "Usage: test [args]\n    --test, -t      \n"
//! );
//! ```

mod classify;
mod dispatch;
mod help;
mod registry;
mod resolve;
mod types;
mod validate;

pub use classify::{END_OF_OPTIONS, flag_name, has_options, is_option, split_value};
pub use dispatch::{DispatchError, Dispatcher, Outcome, Resolution};
pub use help::{help_message_for_command, help_message_for_program};
pub use registry::{Program, ProgramId, Registry, RegistryError};
pub use resolve::find_exact_command;
pub use types::*;
pub use validate::{
    ValidationError, validate_command, validate_options, validate_program,
};
