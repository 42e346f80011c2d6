//! Declarative command trees.
//!
//! A manifest describes the root program, its commands and nested programs.
//! It is read from YAML (or JSON for `.json` files) and turned into a
//! [`Registry`] with one shared action attached to every command.
//!
//! # Example YAML
//!
//! ```yaml
//! name: cli
//! commands:
//!   - name: test
//!     options:
//!       - name: test
//!         aliases: [t]
//!         type: boolean
//!         description: testing
//! programs:
//!   - name: test1
//!     commands:
//!       - name: test
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use command_router_core::{
    Invocable, OptionSpec, ProgramId, Registry, ValidationError, validate_command,
    validate_program,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::Result;

/// A validation problem and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {error}")]
pub struct ManifestIssue {
    /// Space-joined names leading to the entry (root name first).
    pub location: String,
    /// What is wrong with it.
    pub error: ValidationError,
}

/// One command entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandManifest {
    /// Leaf name
    pub name: String,
    /// Declared options
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl CommandManifest {
    /// Creates a command entry without options.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: Vec::new(),
        }
    }

    /// Adds an option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }
}

/// A program node: commands plus nested programs.
///
/// The manifest root is itself a program; its name becomes the registry's
/// root name. Keys other than the ones below, such as a free-text
/// `description`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Program name
    pub name: String,
    /// Commands registered directly on this program
    #[serde(default)]
    pub commands: Vec<CommandManifest>,
    /// Nested programs
    #[serde(default)]
    pub programs: Vec<Manifest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} program(s), {} command(s))",
            self.name,
            self.program_count(),
            self.command_count()
        )
    }
}

impl Manifest {
    /// Creates an empty program node.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a command.
    pub fn with_command(mut self, command: CommandManifest) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds a nested program.
    pub fn with_program(mut self, program: Manifest) -> Self {
        self.programs.push(program);
        self
    }

    /// Loads a manifest, as JSON for `.json` files and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ManifestError::IoError) if the file cannot
    /// be read, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let manifest: Self = match Format::of(path) {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(path = %path.display(), manifest = %manifest, "Loaded manifest");
        Ok(manifest)
    }

    /// Saves the manifest, as JSON for `.json` files and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ManifestError::IoError) if the file cannot
    /// be written, or a JSON/YAML error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match Format::of(path) {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    /// Parses a YAML manifest.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Parses a JSON manifest.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Number of program nodes, this one included.
    pub fn program_count(&self) -> usize {
        1 + self.programs.iter().map(Manifest::program_count).sum::<usize>()
    }

    /// Number of commands in the whole tree.
    pub fn command_count(&self) -> usize {
        self.commands.len() + self.programs.iter().map(Manifest::command_count).sum::<usize>()
    }

    /// Collects every validation problem in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_router_core::{OptionSpec, ValidationError};
    /// use command_router_manifest::{CommandManifest, Manifest};
    ///
    /// let manifest = Manifest::new("cli").with_program(
    ///     Manifest::new("tools").with_command(
    ///         CommandManifest::new("build")
    ///             .with_option(OptionSpec::boolean("release").with_alias("r"))
    ///             .with_option(OptionSpec::boolean("r")),
    ///     ),
    /// );
    ///
    /// let issues = manifest.validate();
    /// assert_eq!(issues.len(), 1);
    /// assert_eq!(issues[0].location, "cli tools build");
    /// assert_eq!(issues[0].error, ValidationError::DuplicateOption("r".into()));
    /// ```
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();
        let mut location = Vec::new();
        self.collect_issues(&mut location, &mut issues);
        issues
    }

    fn collect_issues<'a>(&'a self, location: &mut Vec<&'a str>, issues: &mut Vec<ManifestIssue>) {
        location.push(&self.name);
        for error in validate_program(&self.name) {
            issues.push(issue_at(location, error));
        }
        for command in &self.commands {
            location.push(&command.name);
            for error in validate_command(&command.name, &command.options) {
                issues.push(issue_at(location, error));
            }
            location.pop();
        }
        for program in &self.programs {
            program.collect_issues(location, issues);
        }

        location.pop();
    }

    /// Builds a registry, attaching `action` to every command.
    ///
    /// Each program registers its own commands before descending into its
    /// nested programs, so registration order is depth-first in manifest
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Invalid`](crate::ManifestError::Invalid) with the first
    /// validation problem, if any.
    pub fn build_registry(&self, action: Arc<dyn Invocable>) -> Result<Registry> {
        if let Some(issue) = self.validate().into_iter().next() {
            return Err(issue.into());
        }

        let mut registry = Registry::new(&self.name);
        let root = registry.root();
        self.register(&mut registry, root, &action)?;
        debug!(
            programs = registry.program_count(),
            commands = registry.command_count(),
            "Built registry from manifest"
        );
        Ok(registry)
    }

    fn register(
        &self,
        registry: &mut Registry,
        program: ProgramId,
        action: &Arc<dyn Invocable>,
    ) -> Result<()> {
        for command in &self.commands {
            registry.command(
                program,
                &command.name,
                command.options.clone(),
                Arc::clone(action),
            )?;
        }
        for child in &self.programs {
            let id = registry.program(program, &child.name)?;
            child.register(registry, id, action)?;
        }
        Ok(())
    }
}

fn issue_at(location: &[&str], error: ValidationError) -> ManifestIssue {
    ManifestIssue {
        location: location.join(" "),
        error,
    }
}

#[cfg(test)]
mod tests {
    use command_router_core::{NoopAction, OptionType, help_message_for_command};

    use super::*;
    use crate::ManifestError;

    fn sample_yaml() -> &'static str {
        r#"
name: cli
commands:
  - name: test
    options:
      - name: test
        aliases: [t]
        type: boolean
        description: testing
programs:
  - name: test1
    commands:
      - name: test
        options:
          - name: level
            aliases: [l]
            type: number
    programs:
      - name: deep
        commands:
          - name: run
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let manifest = Manifest::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(manifest.name, "cli");
        assert_eq!(manifest.commands[0].options[0].aliases, vec!["t"]);
        assert_eq!(
            manifest.programs[0].commands[0].options[0].option_type,
            OptionType::Number
        );
        assert_eq!(manifest.program_count(), 3);
        assert_eq!(manifest.command_count(), 3);
    }

    #[test]
    fn test_deserialize_minimal() {
        let manifest = Manifest::from_yaml_str("name: cli\n").unwrap();
        assert!(manifest.commands.is_empty());
        assert!(manifest.programs.is_empty());
        assert!(manifest.validate().is_empty());
    }

    #[test]
    fn test_json_matches_yaml() {
        let json = r#"{
            "name": "cli",
            "commands": [
                {"name": "test", "options": [{"name": "test", "aliases": ["t"], "type": "boolean", "description": "testing"}]}
            ],
            "programs": [
                {"name": "test1", "commands": [{"name": "test", "options": [{"name": "level", "aliases": ["l"], "type": "number"}]}],
                 "programs": [{"name": "deep", "commands": [{"name": "run"}]}]}
            ]
        }"#;
        let from_json = Manifest::from_json_str(json).unwrap();
        let from_yaml = Manifest::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_build_registry_paths_and_order() {
        let manifest = Manifest::from_yaml_str(sample_yaml()).unwrap();
        let registry = manifest.build_registry(Arc::new(NoopAction)).unwrap();

        let paths: Vec<String> = registry.commands().map(|c| c.path.join(" ")).collect();
        assert_eq!(paths, vec!["test", "test1 test", "test1 deep run"]);

        let first = registry.commands().next().unwrap();
        assert_eq!(
            help_message_for_command(first),
            "Usage: test [args]\n    --test, -t     testing \n"
        );
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let manifest = Manifest::new("cli")
            .with_command(CommandManifest::new(""))
            .with_program(
                Manifest::new("tools").with_command(
                    CommandManifest::new("build").with_option(OptionSpec::boolean("--release")),
                ),
            );

        let issues = manifest.validate();
        assert_eq!(
            issues,
            vec![
                ManifestIssue {
                    location: "cli ".to_string(),
                    error: ValidationError::EmptyCommandName,
                },
                ManifestIssue {
                    location: "cli tools build".to_string(),
                    error: ValidationError::InvalidOptionName("--release".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_description_keys_are_ignored() {
        let raw = r#"
name: cli
description: Sample router
commands:
  - name: run
    description: Runs things
"#;
        let manifest = Manifest::from_yaml_str(raw).unwrap();
        assert_eq!(manifest, Manifest::new("cli").with_command(CommandManifest::new("run")));

        let saved = serde_yaml::to_string(&manifest).unwrap();
        assert!(!saved.contains("description"), "{saved}");
    }

    #[test]
    fn test_build_registry_fails_fast() {
        let manifest = Manifest::new("").with_command(CommandManifest::new("run"));
        let err = manifest.build_registry(Arc::new(NoopAction)).unwrap_err();

        assert!(matches!(
            err,
            ManifestError::Invalid(ManifestIssue {
                error: ValidationError::EmptyProgramName,
                ..
            })
        ));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let original = Manifest::from_yaml_str(sample_yaml()).unwrap();

        for file in ["routes.yml", "routes.json"] {
            let path = dir.path().join(file);
            original.save(&path).unwrap();
            let loaded = Manifest::load(&path).unwrap();
            assert_eq!(loaded, original, "{file}");
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::IoError(_)));
    }
}
