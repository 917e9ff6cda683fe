//! Deployment update CLI entrypoint.
//!
//! This is the main entrypoint for the deployment-update command-line tool.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use deployment_update::cli::{Cli, Commands, OutputFormatter};
use deployment_update::error::Result;
use deployment_update::planner::UpdatePlan;
use deployment_update::topology::{ExtractorSettings, TopologyParser, TopologyValidator};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for a plan that cannot be applied incrementally.
const EXIT_UNSUPPORTED: u8 = 2;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Plan {
            current,
            target,
            detailed,
        } => cmd_plan(&current, &target, detailed, &formatter),
        Commands::Validate { path } => cmd_validate(&path, &formatter),
    }
}

/// Computes and prints the update plan.
fn cmd_plan(
    current_path: &Path,
    target_path: &Path,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    load_dotenv_near(target_path)?;
    let settings = ExtractorSettings::from_env()?;
    debug!("Extractor settings: {settings:?}");

    info!(
        "Planning update from {} to {}",
        current_path.display(),
        target_path.display()
    );
    let parser = TopologyParser::new();
    let current = parser.load_file(current_path)?;
    let target = parser.load_file(target_path)?;

    let plan = UpdatePlan::build(&current, &target, &settings)?;
    emit(&formatter.format_plan(&plan, detailed))?;

    if plan.can_apply_incrementally() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(
            "{} changes require a full redeploy",
            plan.unsupported_steps.len()
        );
        Ok(ExitCode::from(EXIT_UNSUPPORTED))
    }
}

/// Loads and validates a single document.
fn cmd_validate(path: &Path, formatter: &OutputFormatter) -> Result<ExitCode> {
    load_dotenv_near(path)?;

    let topology = TopologyParser::new().load_file(path)?;
    let label = path.display().to_string();
    let summary = TopologyValidator::new().validate(&topology, &label)?;

    emit(&formatter.format_validation(&label, &summary))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads the `.env` file next to a document, if any.
fn load_dotenv_near(path: &Path) -> Result<()> {
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    TopologyParser::new().with_base_path(base).load_dotenv()
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
