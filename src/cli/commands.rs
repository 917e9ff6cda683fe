//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deployment update planner - diff a live topology against a new plan.
#[derive(Parser, Debug)]
#[command(name = "deployment-update")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, env = "DEPLOYMENT_UPDATE_LOG_JSON")]
    pub log_json: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the update steps between two topology documents.
    Plan {
        /// Topology currently installed (YAML or JSON).
        #[arg(long, env = "DEPLOYMENT_UPDATE_CURRENT")]
        current: PathBuf,

        /// Newly compiled plan (YAML or JSON).
        #[arg(long, env = "DEPLOYMENT_UPDATE_TARGET")]
        target: PathBuf,

        /// Show topology order and fingerprints for every step.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Validate a single topology document.
    Validate {
        /// Document to validate.
        path: PathBuf,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
