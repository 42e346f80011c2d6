//! Registration-time validation.
//!
//! Checks the structural invariants of commands and their options before they
//! enter a [`Registry`](crate::Registry): non-empty names, well-formed flag
//! names, and no name or alias used twice within one command. Catching these
//! at registration keeps option matching unambiguous later.
//!
//! # Examples
//!
//! ```
//! use command_router_core::*;
//!
//! let ok = vec![OptionSpec::boolean("verbose").with_alias("v")];
//! assert!(validate_options(&ok).is_empty());
//!
//! // Alias duplicates another option's name
//! let bad = vec![
//!     OptionSpec::boolean("verbose").with_alias("v"),
//!     OptionSpec::boolean("v"),
//! ];
//! assert_eq!(
//!     validate_options(&bad),
//!     vec![ValidationError::DuplicateOption("v".into())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::OptionSpec;

/// Command and option validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Program name is empty or whitespace-only.
    #[error("program name cannot be empty")]
    EmptyProgramName,
    /// Option name is empty or whitespace-only.
    #[error("option name cannot be empty")]
    EmptyOptionName,
    /// Option name or alias carries hyphens, `=` or whitespace.
    #[error("invalid option name: {0}")]
    InvalidOptionName(String),
    /// A name or alias is used twice within one command.
    #[error("duplicate option in command: {0}")]
    DuplicateOption(String),
}

/// Validates a command name and its options.
///
/// Returns every problem found, in declaration order.
pub fn validate_command(name: &str, options: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
    }
    errors.extend(validate_options(options));
    errors
}

/// Validates a program name.
pub fn validate_program(name: &str) -> Vec<ValidationError> {
    if name.trim().is_empty() {
        return vec![ValidationError::EmptyProgramName];
    }
    Vec::new()
}

/// Validates the options declared by one command.
pub fn validate_options(options: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for option in options {
        if option.name.trim().is_empty() {
            errors.push(ValidationError::EmptyOptionName);
            continue;
        }

        for flag in std::iter::once(&option.name).chain(option.aliases.iter()) {
            if !is_valid_flag_name(flag) {
                errors.push(ValidationError::InvalidOptionName(flag.clone()));
            } else if !seen.insert(flag.as_str()) {
                errors.push(ValidationError::DuplicateOption(flag.clone()));
            }
        }
    }

    errors
}

fn is_valid_flag_name(flag: &str) -> bool {
    !flag.is_empty()
        && !flag.starts_with('-')
        && !flag.contains('=')
        && !flag.chars().any(char::is_whitespace)
}
