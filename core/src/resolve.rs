//! Disambiguation between commands sharing a name.
//!
//! [`find_exact_command`] picks one command among candidates that matched the
//! same invocation:
//!
//! 1. When the tokens contain option flags, the candidate declaring the most
//!    of the given flags (by name or alias) wins.
//! 2. Otherwise, or among candidates tied on that count, the longest path
//!    wins, so a command registered on a nested program shadows a shallower
//!    one with the same name.
//! 3. Remaining ties go to the first candidate in the given order.

use std::collections::HashSet;

use tracing::debug;

use crate::Command;
use crate::classify::{flag_name, has_options};

/// Counts how many of the command's options appear among the flag names.
fn option_matches(command: &Command, flags: &HashSet<&str>) -> usize {
    command
        .options
        .iter()
        .filter(|opt| {
            flags.contains(opt.name.as_str()) || opt.aliases.iter().any(|a| flags.contains(a.as_str()))
        })
        .count()
}

/// Keeps the candidates that share the highest score, in input order.
fn top_scoring<'a, F>(candidates: Vec<&'a Command>, score: F) -> Vec<&'a Command>
where
    F: Fn(&Command) -> usize,
{
    let scored: Vec<(usize, &Command)> = candidates.into_iter().map(|c| (score(c), c)).collect();
    let best = scored.iter().map(|(s, _)| *s).max().unwrap_or(0);
    scored
        .into_iter()
        .filter(|(s, _)| *s == best)
        .map(|(_, c)| c)
        .collect()
}

/// Selects the best command among `candidates` for `tokens`.
///
/// Returns `None` only when there are no candidates. A single candidate is
/// returned as is.
///
/// # Examples
///
/// ```
/// use command_router_core::*;
/// use std::sync::Arc;
///
/// let shallow = Command::new("test", vec!["test".into()], vec![], Arc::new(NoopAction));
/// let nested = Command::new(
///     "test",
///     vec!["test1".into(), "test".into()],
///     vec![OptionSpec::boolean("test").with_alias("t")],
///     Arc::new(NoopAction),
/// );
///
/// let found = find_exact_command([&shallow, &nested], &["--test"]).unwrap();
/// assert_eq!(found.path, vec!["test1", "test"]);
/// ```
pub fn find_exact_command<'a, I, S>(candidates: I, tokens: &[S]) -> Option<&'a Command>
where
    I: IntoIterator<Item = &'a Command>,
    S: AsRef<str>,
{
    let mut remaining: Vec<&Command> = candidates.into_iter().collect();
    if remaining.len() <= 1 {
        return remaining.pop();
    }

    if has_options(tokens) {
        let flags: HashSet<&str> = tokens.iter().filter_map(|t| flag_name(t.as_ref())).collect();
        remaining = top_scoring(remaining, |c| option_matches(c, &flags));
        if remaining.len() == 1 {
            debug!(command = ?remaining[0].path, "Resolved by option matches");
            return remaining.pop();
        }
    }

    remaining = top_scoring(remaining, Command::depth);
    let chosen = remaining.first().copied();
    if let Some(command) = chosen {
        debug!(
            command = ?command.path,
            tied = remaining.len(),
            "Resolved by path length"
        );
    }
    chosen
}
