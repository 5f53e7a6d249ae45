//! paramsync CLI entrypoint.
//!
//! This is the main entrypoint for the paramsync command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use paramsync::cli::{Cli, OutputFormatter, ValidationReport};
use paramsync::config::{ManifestParser, find_manifest};
use paramsync::console::TerminalConsole;
use paramsync::error::{ConfigError, Result};
use paramsync::processor::FileProcessor;
use paramsync::reconciler::SystemEnv;
use paramsync::Commands;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Load .env if present; failure is not fatal
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from: {}", path.display());
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Sync {
            non_interactive,
            keep_going,
        } => cmd_sync(cli.config.as_deref(), non_interactive, keep_going, &formatter),
        Commands::Validate => cmd_validate(cli.config.as_deref(), &formatter),
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

/// Resolves the manifest path from the flag or by walking up from the
/// current directory.
fn resolve_manifest_path(config: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| paramsync::ParamsyncError::io(PathBuf::from("."), e))?;
    find_manifest(&cwd).ok_or_else(|| {
        ConfigError::ManifestNotFound {
            path: cwd.join("paramsync.yaml"),
        }
        .into()
    })
}

/// Reconcile every file listed in the manifest.
fn cmd_sync(
    config: Option<&Path>,
    non_interactive: bool,
    keep_going: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let manifest_path = resolve_manifest_path(config)?;
    info!("Using manifest: {}", manifest_path.display());

    let manifest = ManifestParser::new().load_file(&manifest_path)?;

    let console = TerminalConsole::new(non_interactive);
    let env = SystemEnv;
    let processor = FileProcessor::new(&console, &env);

    let report = processor.process_all(&manifest.files, keep_going)?;
    print!("{}", formatter.format_run(&report));

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Validate the manifest and its job settings.
fn cmd_validate(config: Option<&Path>, formatter: &OutputFormatter) -> Result<ExitCode> {
    let manifest_path = resolve_manifest_path(config)?;
    info!("Validating manifest: {}", manifest_path.display());

    let manifest = ManifestParser::new().load_file(&manifest_path)?;

    let mut errors = Vec::new();
    for job in &manifest.files {
        if let Err(e) = job.resolve() {
            errors.push(format!("{}: {e}", job.file.display()));
        }
    }

    let report = ValidationReport {
        valid: errors.is_empty(),
        jobs: manifest.files.len(),
        errors,
    };
    print!("{}", formatter.format_validation(&report));

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Write a starter manifest and dist file.
fn cmd_init(path: &Path, force: bool) -> Result<ExitCode> {
    info!("Initializing paramsync in: {}", path.display());

    let manifest_path = path.join("paramsync.yaml");
    let dist_path = path.join("parameters.yml.dist");

    if !force && manifest_path.exists() {
        eprintln!("Manifest already exists: {}", manifest_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| paramsync::ParamsyncError::io(path.to_path_buf(), e))?;
    }

    let manifest_template = include_str!("../templates/paramsync.yaml");
    paramsync::storage::write_atomic(&manifest_path, manifest_template)?;
    eprintln!("Created: {}", manifest_path.display());

    if force || !dist_path.exists() {
        let dist_template = include_str!("../templates/parameters.yml.dist");
        paramsync::storage::write_atomic(&dist_path, dist_template)?;
        eprintln!("Created: {}", dist_path.display());
    }

    eprintln!("\nNext steps:");
    eprintln!("  1. Edit parameters.yml.dist with the parameters your project needs");
    eprintln!("  2. Run 'paramsync sync' to generate parameters.yml");
    eprintln!("  3. Commit paramsync.yaml and parameters.yml.dist; ignore parameters.yml");

    Ok(ExitCode::SUCCESS)
}
