use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use command_router_core::{
    Dispatcher, Invocation, NoopAction, Outcome, Registry, help_message_for_command,
    help_message_for_program,
};
use command_router_manifest::Manifest;
use serde::Serialize;
use tracing::{debug, info};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "route")]
#[command(about = "Resolve invocations and render help against a route manifest")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Log resolution decisions to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a manifest and report every problem found.
    Validate(ValidateArgs),
    /// Resolve an invocation and print the parsed command.
    Resolve(ResolveArgs),
    /// Print help for a command or program.
    Help(HelpArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Manifest file (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Manifest file (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Invocation tokens, e.g. `-- test --test`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Manifest file (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
    /// Program and command names, e.g. `test1 test`. Empty for the root.
    path: Vec<String>,
}

/// What `route resolve` prints for a command that would run.
#[derive(Debug, Serialize)]
struct ResolveReport {
    command: String,
    #[serde(flatten)]
    invocation: Invocation,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Help(args) => run_help(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();
}

fn load_manifest(path: &Path) -> Result<Manifest, String> {
    Manifest::load(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn load_registry(path: &Path) -> Result<Registry, String> {
    let manifest = load_manifest(path)?;
    let registry = manifest
        .build_registry(Arc::new(NoopAction))
        .map_err(|err| err.to_string())?;
    info!(manifest = %manifest, "Registry ready");
    Ok(registry)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let manifest = load_manifest(&args.manifest)?;
    let issues = manifest.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("  {issue}");
        }
        return Err(format!(
            "{} validation issue(s) in '{}'",
            issues.len(),
            args.manifest.display()
        ));
    }

    println!(
        "Validated manifest '{}': {} program(s), {} command(s).",
        manifest.name,
        manifest.program_count(),
        manifest.command_count()
    );
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let registry = load_registry(&args.manifest)?;
    debug!(tokens = ?args.tokens, "Resolving invocation");

    match Dispatcher::new(&registry)
        .dispatch(&args.tokens)
        .map_err(|err| err.to_string())?
    {
        Outcome::Help(text) => print!("{text}"),
        Outcome::Ran(invocation) => {
            let report = ResolveReport {
                command: invocation.path.join(" "),
                invocation,
            };
            println!("{}", format_report(&report, args.format)?);
        }
    }
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let registry = load_registry(&args.manifest)?;

    if let Some(program) = registry.find_program(&args.path) {
        print!("{}", help_message_for_program(&registry, program));
        return Ok(());
    }

    let resolution = Dispatcher::new(&registry)
        .resolve(&args.path)
        .map_err(|err| err.to_string())?;
    if !resolution.args.is_empty() {
        return Err(format!(
            "unexpected arguments after '{}': {}",
            resolution.command.path.join(" "),
            resolution.args.join(" ")
        ));
    }
    print!("{}", help_message_for_command(resolution.command));
    Ok(())
}

fn format_report(report: &ResolveReport, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|err| format!("Failed to serialize report: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(report)
            .map(|raw| raw.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize report: {err}")),
    }
}
