//! Option token classification.
//!
//! A token is an option flag when it starts with one or two hyphens followed
//! by at least one more character. The bare `--` is the end-of-options marker
//! and never counts as a flag; a bare `-` is a positional (conventionally
//! stdin).
//!
//! # Examples
//!
//! ```
//! use command_router_core::{flag_name, has_options};
//!
//! assert!(has_options(&["--test=123"]));
//! assert!(!has_options(&["build", "--"]));
//! assert_eq!(flag_name("--test=123"), Some("test"));
//! assert_eq!(flag_name("-t"), Some("t"));
//! ```

/// End-of-options marker.
pub const END_OF_OPTIONS: &str = "--";

fn strip_hyphens(token: &str) -> Option<&str> {
    if token == END_OF_OPTIONS {
        return None;
    }
    let rest = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    if rest.is_empty() || rest.starts_with('-') {
        return None;
    }
    Some(rest)
}

/// Returns `true` if `token` is an option flag.
pub fn is_option(token: &str) -> bool {
    strip_hyphens(token).is_some()
}

/// Returns `true` if at least one token is an option flag.
pub fn has_options<S: AsRef<str>>(tokens: &[S]) -> bool {
    tokens.iter().any(|t| is_option(t.as_ref()))
}

/// Splits an option token into its bare flag name and inline value.
///
/// Returns `None` for positional tokens and `--`.
///
/// ```
/// use command_router_core::split_value;
///
/// assert_eq!(split_value("--port=80"), Some(("port", Some("80"))));
/// assert_eq!(split_value("-v"), Some(("v", None)));
/// assert_eq!(split_value("serve"), None);
/// ```
pub fn split_value(token: &str) -> Option<(&str, Option<&str>)> {
    let rest = strip_hyphens(token)?;
    Some(match rest.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (rest, None),
    })
}

/// Returns the bare flag name of an option token.
pub fn flag_name(token: &str) -> Option<&str> {
    split_value(token).map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_regular_args() {
        assert!(has_options(&["--test"]));
    }

    #[test]
    fn test_detects_alias() {
        assert!(has_options(&["-t"]));
    }

    #[test]
    fn test_detects_arg_with_value() {
        assert!(has_options(&["--test=123"]));
    }

    #[test]
    fn test_detects_multiple_args() {
        assert!(has_options(&["--test", "--test2"]));
    }

    #[test]
    fn test_positional_only_is_false() {
        assert!(!has_options(&["test"]));
        assert!(!has_options(&["a", "b", "c=d", "x-y"]));
        assert!(!has_options::<&str>(&[]));
    }

    #[test]
    fn test_end_of_options_marker_is_not_a_flag() {
        assert!(!has_options(&["--"]));
        assert!(!is_option("--"));
        assert_eq!(flag_name("--"), None);
    }

    #[test]
    fn test_edge_tokens_are_positional() {
        assert!(!is_option("-"));
        assert!(!is_option("---"));
        assert!(!is_option("---x"));
    }

    #[test]
    fn test_owned_tokens() {
        let tokens = vec!["serve".to_string(), "-p".to_string()];
        assert!(has_options(&tokens));
    }

    #[test]
    fn test_split_value() {
        assert_eq!(split_value("--name=a=b"), Some(("name", Some("a=b"))));
        assert_eq!(split_value("--name="), Some(("name", Some(""))));
        assert_eq!(split_value("--name"), Some(("name", None)));
        assert_eq!(flag_name("-p=1"), Some("p"));
    }
}
